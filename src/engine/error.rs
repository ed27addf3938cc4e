use thiserror::Error;

use crate::exporter;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Exporter failure: {0}")]
    Exporter(#[from] exporter::Error),

    #[error("Could not serialize the metrics snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
