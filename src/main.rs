use std::sync::Arc;

use log::info;
use playtrack_server::{build, config::ServerConfig, logs::init_logger, shutdown_signal};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }

    let _logger = init_logger().expect("Failed to initialize logger");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(&config.uploads_dir).await {
        log::error!(
            "Failed to create uploads directory {}: {}",
            config.uploads_dir.display(),
            e
        );
        std::process::exit(1);
    }

    let app = Arc::new(build(&config).await);

    info!("Starting application");

    if let Err(e) = playtrack_http_api::run(
        app,
        config.uploads_dir.clone(),
        config.host.clone(),
        config.port,
        shutdown_signal(),
    )
    .await
    {
        log::error!("HTTP API failed: {}", e);
        std::process::exit(1);
    }
}
