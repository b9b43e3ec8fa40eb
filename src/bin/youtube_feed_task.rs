// Scheduled YouTube sync: a forced auto-update run, meant for cron
use std::sync::Arc;

use youtube_feed::config::AppConfig;
use youtube_feed::db;
use youtube_feed::logging::init_logging;
use youtube_feed::services::SyncOutcome;
use youtube_feed::store::{PgSettingsStore, PgVideoStore};
use youtube_feed::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_logging()?;

    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config).await?;
    db::run_migrations(&pool).await?;

    let state = AppState::new(
        config,
        Arc::new(PgVideoStore::new(pool.clone())),
        Arc::new(PgSettingsStore::new(pool)),
    );

    match state.feed.run_auto_update(true).await {
        Ok(SyncOutcome::Ran { synced, last_saved }) => {
            tracing::info!(synced, %last_saved, "YouTube feed task finished");
            Ok(())
        }
        Ok(SyncOutcome::Skipped) => {
            tracing::info!("YouTube feed task skipped");
            Ok(())
        }
        Err(e) => {
            tracing::error!("YouTube feed task failed: {}", e);
            Err(e.into())
        }
    }
}
