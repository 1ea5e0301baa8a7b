use axum::middleware::from_fn_with_state;
use axum::routing::{get, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer, SecurityPolicy};
use crate::handlers::schedules::{
    create_schedule, delete_schedule, list_schedules, update_schedule,
};
use crate::handlers::{health_check, root_banner};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub const SCHEDULE_PREFIX: &str = "/api/schedule";

/// Schedule CRUD, every route behind the auth gate.
pub fn schedule_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route("/:id", put(update_schedule).delete(delete_schedule))
        .route_layer(from_fn_with_state(state, require_auth))
}

/// Layers applied around the whole application.
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    pub allowed_origins: Option<String>,
    pub include_hsts: bool,
}

pub fn create_routes(state: AppState, options: &HttpOptions) -> Router {
    let router = Router::new()
        .route("/", get(root_banner))
        .route("/health", get(health_check))
        .nest(SCHEDULE_PREFIX, schedule_routes(state.clone()))
        .with_state(state);

    apply_security_headers(router, SecurityPolicy::new(options.include_hsts))
        .layer(create_cors_layer(options.allowed_origins.as_deref()))
        .layer(TraceLayer::new_for_http())
}
