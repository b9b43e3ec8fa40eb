use std::net::SocketAddr;
use std::sync::Arc;

use youtube_feed::config::AppConfig;
use youtube_feed::db;
use youtube_feed::handlers;
use youtube_feed::logging::init_logging;
use youtube_feed::store::{PgSettingsStore, PgVideoStore};
use youtube_feed::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    init_logging()?;

    let config = AppConfig::from_env()?;

    let db_pool = db::create_pool(&config).await?;
    db::run_migrations(&db_pool).await?;
    tracing::info!("Database ready, migrations applied");

    tracing::info!(
        "OAuth redirect URI: {} (register it with the Google project)",
        config.redirect_uri()
    );

    let bind_addr = config.bind_addr.clone();
    let shared_state = Arc::new(AppState::new(
        config,
        Arc::new(PgVideoStore::new(db_pool.clone())),
        Arc::new(PgSettingsStore::new(db_pool)),
    ));

    let app = handlers::router(shared_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
