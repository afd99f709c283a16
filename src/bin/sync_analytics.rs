//! Rebuilds the analytics store from the graph store, keeping accumulated points.

use std::sync::Arc;

use playtrack_analytics_sea_orm::{AnalyticsConnectOptions, AnalyticsRepositoryImpl};
use playtrack_server::{config::ServerConfig, logs::init_logger, sea_orm_application};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _logger = init_logger().expect("Failed to initialize logger");
    let config = ServerConfig::from_env().expect("Invalid configuration");

    let url = config
        .analytics_database_url
        .clone()
        .expect("ANALYTICS_DATABASE_URL must be set");
    let analytics = AnalyticsRepositoryImpl::connect(AnalyticsConnectOptions::new(url))
        .await
        .expect("Failed to connect to the analytics store");

    let app = sea_orm_application(&config, Arc::new(analytics)).await;
    match app.sync_all_use_case.sync_all().await {
        Ok(synced) => println!("Synced {} players to the analytics store", synced),
        Err(e) => panic!("Sync failed: {:?}", e),
    }
}
