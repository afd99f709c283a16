use std::sync::Arc;

use log::info;
use playtrack_analytics_sea_orm::{AnalyticsConnectOptions, AnalyticsRepositoryImpl};
use playtrack_app::{
    Application, build_application,
    domain::{analytics::AnalyticsRepository, credentials::BcryptPasswordHasher},
};
use playtrack_avatar_fs::FsAvatarStorage;
use playtrack_persistence_memory::{InMemoryAnalytics, InMemoryGraphStore};
use playtrack_persistence_sea_orm::{
    forum::ForumRepositoryImpl, games::GameRepositoryImpl, players::PlayerRepositoryImpl,
    ratings::RatingRepositoryImpl, social::SocialRepositoryImpl,
};

use crate::config::{ServerConfig, StorageBackend};

pub mod config;
pub mod logs;

/// Wires the graph store adapters over the configured database.
pub async fn sea_orm_application<A>(config: &ServerConfig, analytics: Arc<A>) -> Application
where
    A: AnalyticsRepository + Send + Sync + 'static,
{
    build_application(
        Arc::new(PlayerRepositoryImpl::new().await),
        Arc::new(GameRepositoryImpl::new().await),
        Arc::new(RatingRepositoryImpl::new().await),
        Arc::new(SocialRepositoryImpl::new().await),
        Arc::new(ForumRepositoryImpl::new().await),
        analytics,
        Arc::new(FsAvatarStorage::new(config.uploads_dir.clone())),
        Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost)),
        config.max_frontier,
    )
}

pub async fn build(config: &ServerConfig) -> Application {
    match config.storage {
        StorageBackend::SeaOrm => {
            let analytics = match &config.analytics_database_url {
                Some(url) => AnalyticsRepositoryImpl::connect_in_background(
                    AnalyticsConnectOptions::new(url.clone()),
                ),
                None => AnalyticsRepositoryImpl::disabled(),
            };
            sea_orm_application(config, Arc::new(analytics)).await
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            let graph = Arc::new(InMemoryGraphStore::new());
            build_application(
                graph.clone(),
                graph.clone(),
                graph.clone(),
                graph.clone(),
                graph,
                Arc::new(InMemoryAnalytics::new()),
                Arc::new(FsAvatarStorage::new(config.uploads_dir.clone())),
                Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost)),
                config.max_frontier,
            )
        }
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received. Preparing graceful exit...");
}
