use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ccbt_lib::records::peer::PeerUpdate;
use ccbt_lib::records::torrent::TorrentUpdate;
use ccbt_test_helpers::configuration;

use super::{start_engine, A_FEW_TICKS};

#[tokio::test]
async fn it_should_stop_within_a_second_right_after_starting() {
    let engine = start_engine(&configuration::ephemeral()).await;

    tokio::time::timeout(Duration::from_secs(1), engine.stop())
        .await
        .expect("the engine should stop promptly");

    assert!(!engine.is_running());
    assert_eq!(engine.metrics_endpoint(), None);
}

#[tokio::test]
async fn it_should_blend_the_live_torrent_rates_into_the_global_rates() {
    let engine = start_engine(&configuration::ephemeral_with_metrics_disabled()).await;

    engine.update_torrent(
        "t1",
        &TorrentUpdate {
            download_rate: Some(2_000.0),
            upload_rate: Some(500.0),
            ..Default::default()
        },
    );

    tokio::time::sleep(A_FEW_TICKS).await;

    let summary = engine.get_metrics_summary();

    engine.stop().await;

    assert!(engine.rate_samples().len() >= 3);
    assert!(summary.global.download_rate > 0.0);
    assert!(summary.global.download_rate <= 2_000.0);
    assert!(summary.global.upload_rate > 0.0);
}

#[tokio::test]
async fn it_should_notify_the_subscriber_on_every_tick() {
    let engine = start_engine(&configuration::ephemeral_with_metrics_disabled()).await;
    let ticks = Arc::new(AtomicUsize::new(0));

    let counter = ticks.clone();
    engine.on_refresh(move |snapshot| {
        assert_eq!(snapshot.torrents, 0);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    tokio::time::sleep(A_FEW_TICKS).await;
    engine.stop().await;

    let ticks_when_stopped = ticks.load(Ordering::SeqCst);
    assert!(ticks_when_stopped >= 2);

    tokio::time::sleep(A_FEW_TICKS).await;
    assert_eq!(ticks.load(Ordering::SeqCst), ticks_when_stopped);
}

#[tokio::test]
async fn it_should_keep_recently_updated_peers_while_running() {
    let mut config = configuration::ephemeral_with_metrics_disabled();
    config.observability.inactive_peer_cleanup_interval = 1;
    config.observability.max_peer_timeout = 60;

    let engine = start_engine(&config).await;

    engine.update_peer("10.0.0.1:6881", &PeerUpdate::default());

    tokio::time::sleep(Duration::from_millis(1_200)).await;
    engine.stop().await;

    assert!(engine.get_peer_metrics("10.0.0.1:6881").is_some());
}

#[tokio::test]
async fn it_should_evict_peers_idle_for_longer_than_the_timeout() {
    let mut config = configuration::ephemeral_with_metrics_disabled();
    config.observability.inactive_peer_cleanup_interval = 1;
    config.observability.max_peer_timeout = 0;

    let engine = start_engine(&config).await;

    engine.update_peer("10.0.0.1:6881", &PeerUpdate::default());

    tokio::time::sleep(Duration::from_millis(1_200)).await;
    engine.stop().await;

    assert!(engine.get_peer_metrics("10.0.0.1:6881").is_none());
}
