use std::net::SocketAddr;
use std::process;
use std::sync::Arc;

use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use edutrack_server::config::Config;
use edutrack_server::middleware::TokenSigner;
use edutrack_server::routes::{create_routes, HttpOptions};
use edutrack_server::state::AppState;
use edutrack_server::store::PgScheduleStore;

const DEFAULT_LOG_FILTER: &str = "edutrack_server=info,tower_http=info";

/// Logs a startup failure and exits; the server never runs degraded.
fn fatal(context: &str, err: impl std::fmt::Display) -> ! {
    tracing::error!(error = %err, "{}", context);
    process::exit(1);
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env().unwrap_or_else(|e| fatal("Invalid configuration", e));
    let tokens =
        TokenSigner::new(&config.auth_secret).unwrap_or_else(|e| fatal("Invalid auth secret", e));

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .unwrap_or_else(|e| fatal("Failed to connect to database", e));

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .unwrap_or_else(|e| fatal("Failed to run migrations", e));

    tracing::info!("Migrations run successfully");

    let state = AppState::new(Arc::new(PgScheduleStore::new(pool)), tokens);
    let options = HttpOptions {
        allowed_origins: config.allowed_origins.clone(),
        include_hsts: config.production,
    };
    let app = create_routes(state, &options);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| fatal("Failed to bind address", e));

    tracing::info!("Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        fatal("Server failed", e);
    }
}
