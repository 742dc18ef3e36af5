pub mod app;
pub mod config;
pub mod metrics;
pub mod session_handlers;

pub use app::{AppState, BackofficeGuard, SERVICE_NAME};

use axum::routing::{get, post};
use axum::{middleware, Router};
use common_auth::resolve_identity;

use session_handlers::{
    health, list_roles, me, metrics_endpoint, record_resolution, validate_session,
};

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/roles", get(list_roles))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            record_resolution,
        ))
        .layer(middleware::from_fn_with_state(
            state.guard.clone(),
            resolve_identity::<BackofficeGuard>,
        ));

    Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_endpoint))
        .route("/session/validate", post(validate_session))
        .merge(protected)
        .with_state(state)
}
