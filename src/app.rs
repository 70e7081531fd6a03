use axum::{Json, Router, extract::State, middleware, routing::get};
use serde_json::json;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tower_http::cors::CorsLayer;

use crate::{
    app_state::AppState,
    middleware::tracing::observability_middleware,
    modules::{appointments::routes::appointment_routes, availability::routes::availability_routes},
    websocket::websocket_routes,
};

pub fn create_router(state: AppState) -> Router {
    // Browser clients are served from the same origin in production.
    let cors = if state.env.is_production() {
        CorsLayer::new()
    } else {
        CorsLayer::permissive()
    };

    Router::new()
        .route("/", get(hello))
        .route("/health", get(health_check))
        .nest("/consultants", availability_routes())
        .nest("/appointments", appointment_routes())
        .merge(websocket_routes())
        .layer(middleware::from_fn(observability_middleware))
        .layer(cors)
        .with_state(state)
}

async fn hello() -> &'static str {
    "ConsultBook says hello!\n"
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let storage_status = if state.scheduler.storage_healthy().await {
        "healthy"
    } else {
        "unhealthy"
    };

    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    Json(json!({
        "status": "ok",
        "timestamp": timestamp,
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.env.app.environment.as_str(),
        "services": {
            "storage": storage_status,
        }
    }))
}
