use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{api, state::AppState, ws};

/// Registration and the chat channel share one listener. The channel is
/// reachable at the root path and at `/ws`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/new-user", post(api::register_user))
        .route("/", get(ws::ws_handler))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
