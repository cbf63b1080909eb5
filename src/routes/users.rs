use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Handler for listing known user ids
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Json<Vec<i64>> {
    let ids = state
        .store
        .user_ids()
        .iter()
        .take(params.limit)
        .copied()
        .collect();
    Json(ids)
}
