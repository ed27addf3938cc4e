use ccbt_lib::app;

#[tokio::main]
async fn main() {
    let app_container = match app::run().await {
        Ok(app_container) => app_container,
        Err(error) => {
            eprintln!("Could not load the configuration: {error}");
            std::process::exit(1);
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("ccBitTorrent metrics daemon shutting down ...");

            app_container.engine.stop().await;

            tracing::info!("ccBitTorrent metrics daemon successfully shutdown.");
        }
    }
}
