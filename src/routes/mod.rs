use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod recipes;
pub mod recommendations;
pub mod users;

use crate::state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        // The dashboard is served from a separate origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list))
        .route("/recommendations", get(recommendations::recommend))
        .route(
            "/recommendations/cold-start",
            post(recommendations::cold_start),
        )
        .route("/recipes/:id", get(recipes::detail))
}

/// Health check endpoint reporting store statistics
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "users": state.store.user_count(),
            "recipes": state.recipes.len(),
        })),
    )
}
