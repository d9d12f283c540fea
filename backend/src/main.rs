use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use compliance_backend::{
    config::Config,
    db::connection::{create_pool, DbPool},
    routes::build_router,
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "compliance_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        database_url = %mask_credentials(&config.database_url),
        read_replica = config.feature_read_replica_enabled && config.read_database_url.is_some(),
        db_max_connections = config.db_max_connections,
        db_lock_timeout_ms = config.db_lock_timeout_ms,
        time_zone = %config.time_zone,
        default_max_licenses = config.default_max_licenses,
        "Loaded configuration from environment/.env"
    );

    // Initialize database
    let write_pool: DbPool = create_pool(&config.database_url, config.db_max_connections).await?;
    sqlx::migrate!("./migrations").run(&write_pool).await?;

    let read_pool = match (&config.read_database_url, config.feature_read_replica_enabled) {
        (Some(url), true) => Some(create_pool(url, config.db_max_connections).await?),
        _ => None,
    };

    let addr = config.bind_address;
    let app = build_router(AppState::new(write_pool, read_pool, config));

    // Start server
    tracing::info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Hides the password part of a connection URL before logging it.
fn mask_credentials(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let userinfo = &url[scheme_end + 3..at];
            let user = userinfo.split(':').next().unwrap_or_default();
            format!("{}{}:***{}", &url[..scheme_end + 3], user, &url[at..])
        }
        _ => url.to_string(),
    }
}
