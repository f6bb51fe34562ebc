//! Aquatrack Server
//!
//! The backend for the Aquatrack aquarium tracker - tanks, fish, plants, and
//! maintenance reminders over a REST API.
//!
//! Uses SQLite (embedded) so a single binary plus a data directory is a
//! complete deployment.

mod error;
mod extractors;
mod handlers;
mod services;
mod storage;

use anyhow::{Context, Result};
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use services::{AuthService, CareService, LivestockService, TankService};
use storage::{Database, QueryCache};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub cache: Arc<QueryCache>,
    pub auth_service: Arc<AuthService>,
    pub tanks: Arc<TankService>,
    pub livestock: Arc<LivestockService>,
    pub care: Arc<CareService>,
}

#[tokio::main]
async fn main() {
    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        eprintln!("[PANIC] at {:?}: {}", location, payload);
        tracing::error!("PANIC at {:?}: {}", location, payload);
    }));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("[FATAL] Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!("Starting Aquatrack Server v{}", env!("CARGO_PKG_VERSION"));
    info!("PID: {}", std::process::id());

    if let Err(e) = run_server().await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server() -> Result<()> {
    info!("Loading configuration...");
    let config = load_config()
        .await
        .context("Failed to load configuration")?;
    info!(
        "Config loaded: bind={}, db={}",
        config.bind_address, config.database_path
    );

    info!("Initializing SQLite database...");
    let db = Arc::new(
        Database::new(&config.database_path)
            .await
            .context("Failed to initialize database")?,
    );
    info!("SQLite database initialized at: {}", config.database_path);

    info!("Initializing query cache...");
    let cache = Arc::new(QueryCache::new());

    info!("Initializing services...");
    let auth_service = Arc::new(AuthService::new(db.clone(), config.jwt_secret.clone()));
    let tanks = Arc::new(TankService::new(db.clone(), cache.clone()));
    let livestock = Arc::new(LivestockService::new(db.clone(), cache.clone()));
    let care = Arc::new(CareService::new(db.clone(), cache.clone()));
    info!("Services initialized");

    let state = AppState {
        db,
        cache,
        auth_service,
        tanks,
        livestock,
        care,
    };

    // Static files directory for the web frontend
    let static_dir =
        std::env::var("STATIC_DIR").unwrap_or_else(|_| "/opt/aquatrack/frontend".to_string());
    info!("Static files directory: {}", static_dir);

    info!("Building HTTP router...");

    let index_path = PathBuf::from(&static_dir).join("index.html");

    let app = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // REST API routes
        .nest("/api/v1", api_routes())
        // Static files
        .nest_service(
            "/assets",
            ServeDir::new(PathBuf::from(&static_dir).join("assets")),
        )
        // SPA fallback - all routes serve index.html
        .fallback_service(ServeFile::new(index_path))
        // Layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config
        .bind_address
        .parse()
        .context("Failed to parse bind address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("Server ready to accept connections");
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/users/me", get(handlers::users::me))
        .route(
            "/tanks",
            get(handlers::tanks::list).post(handlers::tanks::create),
        )
        .route(
            "/tanks/:id",
            get(handlers::tanks::get)
                .patch(handlers::tanks::update)
                .delete(handlers::tanks::delete),
        )
        .route("/tanks/:id/reminders", get(handlers::tanks::reminders))
        .route(
            "/fish",
            get(handlers::fish::list).post(handlers::fish::create),
        )
        .route(
            "/fish/:id",
            patch(handlers::fish::update).delete(handlers::fish::delete),
        )
        .route("/fish/:id/complete", post(handlers::fish::complete))
        .route(
            "/plants",
            get(handlers::plants::list).post(handlers::plants::create),
        )
        .route(
            "/plants/:id",
            patch(handlers::plants::update).delete(handlers::plants::delete),
        )
        .route("/plants/:id/complete", post(handlers::plants::complete))
        .route(
            "/species/fish",
            get(handlers::species::list_fish).post(handlers::species::create_fish),
        )
        .route(
            "/species/plants",
            get(handlers::species::list_plants).post(handlers::species::create_plant),
        )
}

#[derive(Debug, Clone)]
struct Config {
    bind_address: String,
    database_path: String,
    jwt_secret: String,
}

async fn load_config() -> Result<Config> {
    info!("Loading configuration from environment...");

    let data_dir = std::env::var("DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/opt/aquatrack/data"));
    info!("Data directory: {}", data_dir.display());

    tokio::fs::create_dir_all(&data_dir)
        .await
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let database_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| {
        let path = data_dir.join("aquatrack.db");
        path.to_string_lossy().to_string()
    });

    let bind_address =
        std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        warn!("JWT_SECRET not set, using default (insecure for production)");
        "change-me-in-production".to_string()
    });

    Ok(Config {
        bind_address,
        database_path,
        jwt_secret,
    })
}
