use std::time::Duration;

use poem::listener::TcpListener;

use stockwise::app::{build_app, AppState};
use stockwise::config::Config;
use stockwise::logging;

const TOKEN_PURGE_INTERVAL: Duration = Duration::from_secs(15 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    logging::init(config.log_format);

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    tokio::fs::create_dir_all(&config.output_dir).await?;

    let state = AppState::new(config);

    let tokens = state.tokens.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(TOKEN_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = tokens.purge_expired().await;
            if purged > 0 {
                tracing::debug!("Purged {} expired sessions", purged);
            }
        }
    });

    let app = build_app(&state);

    let addr = format!("0.0.0.0:{}", state.config.port);
    tracing::info!("Starting Stockwise server on {}", addr);
    if !state.runner.script().exists() {
        tracing::warn!(
            "Forecast script not found at {}",
            state.runner.script().display()
        );
    }

    poem::Server::new(TcpListener::bind(&addr)).run(app).await?;

    Ok(())
}
