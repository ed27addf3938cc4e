use std::net::TcpListener;

use ccbt_lib::records::torrent::TorrentUpdate;
use ccbt_test_helpers::configuration;
use reqwest::header::CONTENT_TYPE;

use super::{start_engine, A_FEW_TICKS};

#[tokio::test]
async fn it_should_serve_the_prometheus_exposition() {
    let engine = start_engine(&configuration::ephemeral()).await;

    engine.update_torrent(
        "t1",
        &TorrentUpdate {
            bytes_downloaded: Some(4_096),
            bytes_uploaded: Some(1_024),
            ..Default::default()
        },
    );

    tokio::time::sleep(A_FEW_TICKS).await;

    let address = engine.metrics_endpoint().expect("the metrics endpoint should be running");

    let response = reqwest::get(format!("http://{address}/metrics")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap(),
        "text/plain; version=0.0.4"
    );

    let body = response.text().await.unwrap();

    assert!(body.contains("# TYPE ccbt_download_rate_bytes_per_second gauge"));
    assert!(body.contains("# TYPE ccbt_upload_rate_bytes_per_second gauge"));
    assert!(body.contains("ccbt_bytes_downloaded_total 4096"));
    assert!(body.contains("ccbt_bytes_uploaded_total 1024"));

    engine.stop().await;
}

#[tokio::test]
async fn it_should_serve_the_exposition_as_json() {
    let engine = start_engine(&configuration::ephemeral()).await;

    tokio::time::sleep(A_FEW_TICKS).await;

    let address = engine.metrics_endpoint().expect("the metrics endpoint should be running");

    let response = reqwest::get(format!("http://{address}/metrics?format=json")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert!(response
        .headers()
        .get(CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("application/json"));

    let json: serde_json::Value = response.json().await.unwrap();

    assert!(json["last_synced_at"].is_u64());
    assert_eq!(json["metrics"].as_array().map(Vec::len), Some(4));

    engine.stop().await;
}

#[tokio::test]
async fn it_should_not_serve_anything_when_metrics_are_disabled() {
    let engine = start_engine(&configuration::ephemeral_with_metrics_disabled()).await;

    assert_eq!(engine.metrics_endpoint(), None);

    engine.stop().await;
}

#[tokio::test]
async fn it_should_keep_aggregating_when_the_endpoint_cannot_bind() {
    let occupied = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port();

    let engine = start_engine(&configuration::ephemeral_with_metrics_port(port)).await;

    assert_eq!(engine.metrics_endpoint(), None);
    assert!(engine.is_running());

    tokio::time::sleep(A_FEW_TICKS).await;
    assert!(!engine.rate_samples().is_empty());

    engine.stop().await;
}

#[tokio::test]
async fn it_should_release_the_port_when_stopped() {
    let engine = start_engine(&configuration::ephemeral()).await;

    let address = engine.metrics_endpoint().expect("the metrics endpoint should be running");

    engine.stop().await;

    assert!(TcpListener::bind(address).is_ok());
}
