//! Pull endpoint for the metrics exporter.
//!
//! ```text
//! GET /metrics               Prometheus text exposition (version 0.0.4)
//! GET /metrics?format=json   The same values as JSON
//! ```
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use ccbt_metrics::prometheus::TEXT_FORMAT_CONTENT_TYPE;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Error, MetricsExporter};
use crate::CCBT_METRICS_LOG_TARGET;

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Prometheus,
    Json,
}

#[derive(Deserialize, Debug, Default)]
pub struct QueryParams {
    #[serde(default)]
    pub format: Format,
}

/// A running endpoint.
#[derive(Debug)]
pub struct Endpoint {
    pub address: SocketAddr,
    pub task: JoinHandle<()>,
}

/// Binds the endpoint and serves it until `cancellation_token` is cancelled.
///
/// # Errors
///
/// Will return an error if the address cannot be bound.
pub async fn start(
    bind_to: SocketAddr,
    exporter: Arc<dyn MetricsExporter>,
    cancellation_token: CancellationToken,
) -> Result<Endpoint, Error> {
    let listener = TcpListener::bind(bind_to)
        .await
        .map_err(|source| Error::Bind { address: bind_to, source })?;

    let address = listener
        .local_addr()
        .map_err(|source| Error::Bind { address: bind_to, source })?;

    let app = router(exporter);

    let task = tokio::spawn(async move {
        tracing::info!(target: CCBT_METRICS_LOG_TARGET, "Metrics endpoint listening on http://{address}/metrics");

        let server = axum::serve(listener, app).with_graceful_shutdown(cancellation_token.cancelled_owned());

        match server.await {
            Ok(()) => tracing::info!(target: CCBT_METRICS_LOG_TARGET, "Metrics endpoint on {address} stopped"),
            Err(error) => tracing::error!(target: CCBT_METRICS_LOG_TARGET, %error, "Metrics endpoint on {address} failed"),
        }
    });

    Ok(Endpoint { address, task })
}

#[must_use]
pub fn router(exporter: Arc<dyn MetricsExporter>) -> Router {
    Router::new().route("/metrics", get(metrics_handler)).with_state(exporter)
}

async fn metrics_handler(State(exporter): State<Arc<dyn MetricsExporter>>, Query(params): Query<QueryParams>) -> Response {
    match params.format {
        Format::Prometheus => ([(header::CONTENT_TYPE, TEXT_FORMAT_CONTENT_TYPE)], exporter.render_prometheus()).into_response(),
        Format::Json => match exporter.render_json() {
            Ok(json) => ([(header::CONTENT_TYPE, "application/json")], json).into_response(),
            Err(error) => {
                tracing::error!(target: CCBT_METRICS_LOG_TARGET, %error, "Could not render metrics as JSON");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()).into_response()
            }
        },
    }
}
