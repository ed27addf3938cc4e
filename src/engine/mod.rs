//! The aggregation engine.
//!
//! It owns the peer and torrent record stores, the rate sample buffer and
//! the exporter, and exposes the synchronous update and query API used by
//! the telemetry producers.
//!
//! ```text
//! producers ──update_peer / update_torrent──▶ record stores ──▶ scores
//!                                                  │
//! refresh job (every metrics_interval) ────────────┤──▶ sample buffer ──▶ subscriber, exporter
//! reaper job (every inactive_peer_cleanup_interval)┘──▶ evicts stale peers
//! ```
//!
//! Every shared structure sits behind its own lock, and no lock is held
//! across an `.await` or while calling out to the subscriber or exporter.
pub mod error;
pub mod jobs;

use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use ccbt_clock::clock::Time;
use ccbt_configuration::Observability;
use tokio_util::sync::CancellationToken;

pub use self::error::Error;
use self::jobs::manager::JobManager;
use self::jobs::{reaper, refresh};
use crate::exporter::MetricsExporter;
use crate::rates::{self, RateSample, Rates, SampleBuffer};
use crate::records::peer::{PeerRecord, PeerUpdate};
use crate::records::repository::Repository;
use crate::records::torrent::{TorrentRecord, TorrentUpdate};
use crate::snapshot::{DhtStats, GlobalMetrics, MetricsSnapshot, SystemMetrics};
use crate::{CurrentClock, CCBT_METRICS_LOG_TARGET};

/// Time `stop` gives each background job to finish.
pub const STOP_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Callback invoked once per refresh tick with the fresh snapshot.
pub type Subscriber = Arc<dyn Fn(&MetricsSnapshot) + Send + Sync>;

#[derive(Debug, Default)]
struct RateState {
    samples: SampleBuffer,
    rates: Rates,
}

pub struct AggregationEngine {
    config: Observability,
    exporter: Arc<dyn MetricsExporter>,

    peers: Repository<PeerRecord>,
    torrents: Repository<TorrentRecord>,
    rates: Mutex<RateState>,

    system: RwLock<SystemMetrics>,
    dht: RwLock<DhtStats>,
    subscriber: RwLock<Option<Subscriber>>,

    jobs: Mutex<Option<JobManager>>,
    endpoint: RwLock<Option<SocketAddr>>,
}

impl AggregationEngine {
    #[must_use]
    pub fn new(config: &Observability, exporter: Arc<dyn MetricsExporter>) -> Self {
        Self {
            config: config.clone(),
            exporter,
            peers: Repository::default(),
            torrents: Repository::default(),
            rates: Mutex::new(RateState::default()),
            system: RwLock::new(SystemMetrics::default()),
            dht: RwLock::new(DhtStats::new()),
            subscriber: RwLock::new(None),
            jobs: Mutex::new(None),
            endpoint: RwLock::new(None),
        }
    }

    /// Spawns the refresh and reaper jobs, and the metrics endpoint when
    /// metrics are enabled and the exporter publishes them.
    ///
    /// A failure to bind the endpoint is logged; the engine keeps working
    /// without it.
    pub async fn start(self: &Arc<Self>) {
        let already_started = lock(&self.jobs).is_some();

        if already_started {
            tracing::warn!(target: CCBT_METRICS_LOG_TARGET, "Metrics engine already started");
            return;
        }

        let mut jobs = JobManager::new();
        let cancellation_token = jobs.cancellation_token();

        jobs.push(
            "metrics_refresh",
            refresh::start_job(self, self.config.refresh_interval(), cancellation_token.clone()),
        );
        jobs.push(
            "stale_peer_reaper",
            reaper::start_job(self, self.config.cleanup_interval(), cancellation_token.clone()),
        );

        if self.config.enable_metrics && self.exporter.is_enabled() {
            self.start_endpoint(&mut jobs, cancellation_token).await;
        }

        *lock(&self.jobs) = Some(jobs);

        tracing::info!(
            target: CCBT_METRICS_LOG_TARGET,
            refresh_interval_ms = self.config.refresh_interval().as_millis(),
            cleanup_interval_secs = self.config.cleanup_interval().as_secs(),
            "Metrics engine started"
        );
    }

    #[cfg(feature = "prometheus")]
    async fn start_endpoint(&self, jobs: &mut JobManager, cancellation_token: CancellationToken) {
        let bind_to = self.config.metrics_bind_address();

        match crate::exporter::server::start(bind_to, self.exporter.clone(), cancellation_token).await {
            Ok(endpoint) => {
                *write(&self.endpoint) = Some(endpoint.address);
                jobs.push("metrics_endpoint", endpoint.task);
            }
            Err(error) => {
                tracing::error!(target: CCBT_METRICS_LOG_TARGET, %error, "Metrics endpoint not started");
            }
        }
    }

    #[cfg(not(feature = "prometheus"))]
    #[allow(clippy::unused_async)]
    async fn start_endpoint(&self, _jobs: &mut JobManager, _cancellation_token: CancellationToken) {}

    /// Cancels the background jobs and waits for them to finish. Does
    /// nothing if the engine was not started.
    pub async fn stop(&self) {
        let jobs = lock(&self.jobs).take();

        let Some(jobs) = jobs else {
            tracing::debug!(target: CCBT_METRICS_LOG_TARGET, "Metrics engine not running, nothing to stop");
            return;
        };

        jobs.cancel();
        jobs.wait_for_all(STOP_GRACE_PERIOD).await;

        *write(&self.endpoint) = None;

        tracing::info!(target: CCBT_METRICS_LOG_TARGET, "Metrics engine stopped");
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.jobs).is_some()
    }

    /// The address the metrics endpoint is bound to, while it is running.
    #[must_use]
    pub fn metrics_endpoint(&self) -> Option<SocketAddr> {
        *read(&self.endpoint)
    }

    /// Upserts the torrent record and recomputes its swarm scores.
    pub fn update_torrent(&self, torrent_id: &str, update: &TorrentUpdate) {
        let now = CurrentClock::now();

        self.torrents
            .upsert(torrent_id, || TorrentRecord::new(torrent_id, now), |record| record.apply(update, now));
    }

    /// Upserts the peer record, recomputes its scores and stamps its
    /// activity time.
    pub fn update_peer(&self, peer_key: &str, update: &PeerUpdate) {
        let now = CurrentClock::now();

        self.peers
            .upsert(peer_key, || PeerRecord::new(peer_key, now), |record| record.apply(update, now));
    }

    #[must_use]
    pub fn get_torrent_metrics(&self, torrent_id: &str) -> Option<TorrentRecord> {
        self.torrents.get(torrent_id)
    }

    #[must_use]
    pub fn get_peer_metrics(&self, peer_key: &str) -> Option<PeerRecord> {
        self.peers.get(peer_key)
    }

    /// Torrents are never evicted by the engine. Returns whether the
    /// torrent was known.
    pub fn remove_torrent(&self, torrent_id: &str) -> bool {
        self.torrents.remove(torrent_id).is_some()
    }

    /// Returns whether the peer was known.
    pub fn remove_peer(&self, peer_key: &str) -> bool {
        self.peers.remove(peer_key).is_some()
    }

    #[must_use]
    pub fn get_metrics_summary(&self) -> MetricsSnapshot {
        let rates = lock(&self.rates).rates;

        MetricsSnapshot {
            global: self.global_metrics(rates),
            system: *read(&self.system),
            dht: read(&self.dht).clone(),
            torrents: self.torrents.len(),
            peers: self.peers.len(),
        }
    }

    /// The current snapshot as indented JSON.
    ///
    /// # Errors
    ///
    /// Will return an error if the snapshot cannot be serialized.
    pub fn export_json(&self) -> Result<String, Error> {
        Ok(self.get_metrics_summary().to_json_pretty()?)
    }

    pub fn set_dht_stats(&self, stats: &DhtStats) {
        *write(&self.dht) = stats.clone();
    }

    #[must_use]
    pub fn get_dht_stats(&self) -> DhtStats {
        read(&self.dht).clone()
    }

    pub fn set_system_stats(&self, stats: SystemMetrics) {
        *write(&self.system) = stats;
    }

    /// Installs the refresh subscriber, replacing the previous one.
    pub fn on_refresh<F>(&self, callback: F)
    where
        F: Fn(&MetricsSnapshot) + Send + Sync + 'static,
    {
        *write(&self.subscriber) = Some(Arc::new(callback));
    }

    /// The buffered global rate samples, oldest first.
    #[must_use]
    pub fn rate_samples(&self) -> Vec<RateSample> {
        lock(&self.rates).samples.iter().copied().collect()
    }

    /// One refresh tick: blends the global rates, records a sample, notifies
    /// the subscriber and syncs the exporter.
    ///
    /// # Errors
    ///
    /// Will return an error if the exporter cannot be synced. The rates and
    /// the sample buffer are updated regardless.
    pub fn refresh(&self) -> Result<MetricsSnapshot, Error> {
        let now = CurrentClock::now();
        let live = self.live_torrent_rates();

        {
            let mut guard = lock(&self.rates);
            let state = &mut *guard;
            state.rates = rates::next_global_rates(&mut state.samples, state.rates, live, now);
        }

        let snapshot = self.get_metrics_summary();

        self.notify(&snapshot);

        self.exporter.sync(&snapshot.global, now)?;

        Ok(snapshot)
    }

    /// Evicts the peers idle for longer than `max_peer_timeout` and returns
    /// how many.
    pub fn reap_stale_peers(&self) -> usize {
        let now = CurrentClock::now();
        let timeout = self.config.peer_timeout();

        self.peers.retain(|peer| peer.idle_for(now) <= timeout)
    }

    /// Mean of the torrents' current rates, zero rates included. `None`
    /// without torrents.
    fn live_torrent_rates(&self) -> Option<Rates> {
        let (count, sum) = self.torrents.fold((0_u32, Rates::default()), |(count, sum), torrent| {
            (
                count + 1,
                Rates::new(sum.download_rate + torrent.download_rate, sum.upload_rate + torrent.upload_rate),
            )
        });

        if count == 0 {
            return None;
        }

        let count = f64::from(count);

        Some(Rates::new(sum.download_rate / count, sum.upload_rate / count))
    }

    fn global_metrics(&self, rates: Rates) -> GlobalMetrics {
        let initial = GlobalMetrics {
            download_rate: rates.download_rate,
            upload_rate: rates.upload_rate,
            ..Default::default()
        };

        self.torrents.fold(initial, |mut global, torrent| {
            global.bytes_downloaded = global.bytes_downloaded.saturating_add(torrent.bytes_downloaded);
            global.bytes_uploaded = global.bytes_uploaded.saturating_add(torrent.bytes_uploaded);
            global.connected_peers += u64::from(torrent.connected_peers);
            global.active_peers += u64::from(torrent.active_peers);
            global
        })
    }

    fn notify(&self, snapshot: &MetricsSnapshot) {
        let subscriber = read(&self.subscriber).clone();

        if let Some(subscriber) = subscriber {
            if catch_unwind(AssertUnwindSafe(|| subscriber(snapshot))).is_err() {
                tracing::error!(target: CCBT_METRICS_LOG_TARGET, "Metrics subscriber panicked");
            }
        }
    }
}

impl Drop for AggregationEngine {
    fn drop(&mut self) {
        if let Some(jobs) = self.jobs.get_mut().unwrap_or_else(PoisonError::into_inner).as_ref() {
            jobs.cancel();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
