//! Units of measurement for the published metrics.
use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    #[display("count")]
    Count,
    #[display("seconds")]
    Seconds,
    #[display("bytes")]
    Bytes,
    #[display("bytes_per_second")]
    BytesPerSecond,
}
