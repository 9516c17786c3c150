use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/refresh", post(handlers::refresh))
        .route("/api/tables/:role", get(handlers::get_table))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}
