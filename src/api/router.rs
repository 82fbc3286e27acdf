use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::health;
use super::keys;
use super::state::AppState;

/// Create the full router with application state
///
/// Serve with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// bare `/keys` route can resolve the caller's peer address.
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Key endpoints
        .route("/keys", get(keys::redirect_to_own_key))
        .route("/keys/ip/{address}", get(keys::get_or_create_key))
        .route("/keys/ip/{address}/{key}", get(keys::verify_key))
        .route("/add_key/ip/{address}", post(keys::add_key))
        .route("/delete_key/ip/{address}", post(keys::delete_key))
        .route("/all_keys", get(keys::list_all_keys))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
