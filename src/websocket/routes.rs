use axum::{Router, routing::get};

use super::ws_handler::notifications_ws;
use crate::app_state::AppState;

pub fn websocket_routes() -> Router<AppState> {
    Router::new().route("/ws/notifications", get(notifications_ws))
}
