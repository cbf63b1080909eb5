use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{ColdStartProfile, Recommendation},
    services::{cold_start, ranking},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub user_id: i64,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

fn default_top_k() -> i64 {
    5
}

/// Ranked recommendation record returned by both ranking modes.
///
/// For known-user ranking `score` is the model's raw output; for cold-start
/// it is the favorite-ingredient match count cast to a float. The two
/// scales are not comparable.
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub recipe_id: i64,
    pub title: String,
    pub score: f64,
}

impl From<Recommendation> for RecommendationResponse {
    fn from(rec: Recommendation) -> Self {
        Self {
            recipe_id: rec.recipe_id,
            title: rec.title,
            score: rec.score,
        }
    }
}

/// Handler for known-user recommendations
pub async fn recommend(
    State(state): State<AppState>,
    Query(params): Query<RecommendQuery>,
) -> AppResult<Json<Vec<RecommendationResponse>>> {
    let top_k = params.top_k.max(0) as usize;
    let recommendations = ranking::rank(&state.store, params.user_id, top_k)?;

    tracing::debug!(
        user_id = params.user_id,
        top_k,
        returned = recommendations.len(),
        "Known-user recommendations served"
    );

    Ok(Json(recommendations.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct ColdStartRequest {
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub diet: String,
    pub cook_time: i64,
    #[serde(default)]
    pub favorites: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

impl ColdStartRequest {
    /// Normalizes the declared preferences: ingredient names are trimmed
    /// and lower-cased, empty entries dropped.
    fn into_profile(self) -> (ColdStartProfile, usize) {
        let normalize = |items: Vec<String>| {
            items
                .into_iter()
                .map(|item| item.trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect()
        };

        let top_k = self.top_k.max(0) as usize;
        let profile = ColdStartProfile {
            cuisines: self.cuisines,
            diet: self.diet,
            cook_time_max: self.cook_time,
            favorites: normalize(self.favorites),
            dislikes: normalize(self.dislikes),
        };

        (profile, top_k)
    }
}

/// Handler for cold-start recommendations
pub async fn cold_start(
    State(state): State<AppState>,
    Json(request): Json<ColdStartRequest>,
) -> Json<Vec<RecommendationResponse>> {
    let (profile, top_k) = request.into_profile();
    let recommendations = cold_start::cold_start_rank(&state.recipes, &profile, top_k);

    tracing::debug!(
        top_k,
        returned = recommendations.len(),
        "Cold-start recommendations served"
    );

    Json(recommendations.into_iter().map(Into::into).collect())
}
