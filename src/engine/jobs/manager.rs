use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::CCBT_METRICS_LOG_TARGET;

/// A named background task.
#[derive(Debug)]
pub struct Job {
    name: String,
    handle: JoinHandle<()>,
}

impl Job {
    pub fn new<N: Into<String>>(name: N, handle: JoinHandle<()>) -> Self {
        Self {
            name: name.into(),
            handle,
        }
    }
}

/// Owns the background jobs of a started engine and the token that stops
/// them.
#[derive(Debug, Default)]
pub struct JobManager {
    jobs: Vec<Job>,
    cancellation_token: CancellationToken,
}

impl JobManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            jobs: Vec::new(),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub fn push<N: Into<String>>(&mut self, name: N, handle: JoinHandle<()>) {
        self.jobs.push(Job::new(name, handle));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// A clone of the shared token. Jobs select on it to know when to stop.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Signals every job to stop. It does not wait for them.
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// Waits for the jobs one after another, giving each one `grace_period`
    /// to finish. Jobs that panic or time out are logged and skipped.
    pub async fn wait_for_all(mut self, grace_period: Duration) {
        for job in self.jobs.drain(..) {
            let name = job.name;

            info!(target: CCBT_METRICS_LOG_TARGET, job = %name, "Waiting for job to finish (timeout of {} ms) ...", grace_period.as_millis());

            match timeout(grace_period, job.handle).await {
                Ok(Ok(())) => info!(target: CCBT_METRICS_LOG_TARGET, job = %name, "Job completed gracefully"),
                Ok(Err(error)) => warn!(target: CCBT_METRICS_LOG_TARGET, job = %name, "Job returned an error: {error:?}"),
                Err(_elapsed) => warn!(target: CCBT_METRICS_LOG_TARGET, job = %name, "Job did not complete in time"),
            }
        }
    }
}
