use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// `config.toml` (or `CONFIG_PATH`) first, environment-only config as fallback
fn load_config() -> Result<AppConfig, StartupError> {
    match AppConfig::load_and_validate() {
        Ok(cfg) => Ok(cfg),
        Err(file_err) => {
            let cfg = AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
            warn!(error = %file_err, "config file unavailable, using environment");
            Ok(cfg)
        }
    }
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = load_config()?;
    init_logging(&cfg.server.log_format);

    // DB connection
    let db_cfg = models::db::DatabaseConfig::from(&cfg.database);
    let db = models::db::connect_with_config(&db_cfg).await?;
    if cfg.database.auto_migrate {
        migration::Migrator::up(&db, None).await?;
        info!("database migrations applied");
    }

    let state = auth::ServerState::seaorm(
        db,
        auth::ServerAuthConfig { jwt_secret: cfg.auth.jwt_secret.clone() },
    );

    // Build router
    let app: Router = routes::build_router(state, build_cors());

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting server crate");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Router over a fresh in-memory store, for tests and local demos.
pub fn in_memory_app(jwt_secret: &str) -> (Router, Arc<service::storage::MemoryStore>) {
    let store = Arc::new(service::storage::MemoryStore::new());
    let state = auth::ServerState::in_memory(
        store.clone(),
        auth::ServerAuthConfig { jwt_secret: jwt_secret.to_string() },
    );
    (routes::build_router(state, build_cors()), store)
}
