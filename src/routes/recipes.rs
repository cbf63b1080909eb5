use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::RecipeRecord,
    state::AppState,
};

/// Full recipe detail returned by the lookup endpoint.
#[derive(Debug, Serialize)]
pub struct RecipeDetailResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub nutrition: Vec<f64>,
    pub minutes: i64,
    pub n_ingredients: i64,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

impl From<&RecipeRecord> for RecipeDetailResponse {
    fn from(recipe: &RecipeRecord) -> Self {
        Self {
            id: recipe.id,
            title: recipe.name.clone(),
            description: recipe.description.clone(),
            tags: recipe.tags.clone(),
            nutrition: recipe.nutrition.clone(),
            minutes: recipe.minutes,
            n_ingredients: recipe.n_ingredients,
            ingredients: recipe.ingredients.clone(),
            steps: recipe.steps.clone(),
        }
    }
}

/// Handler for recipe detail lookup
pub async fn detail(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> AppResult<Json<RecipeDetailResponse>> {
    let recipe = state
        .recipes
        .get(recipe_id)
        .ok_or_else(|| AppError::NotFound(format!("Recipe {recipe_id} not found")))?;

    Ok(Json(RecipeDetailResponse::from(recipe)))
}
