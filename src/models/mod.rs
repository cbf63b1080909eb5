use std::collections::HashSet;

use serde::Serialize;

/// A single ranked recommendation.
///
/// `score` is the model's raw output for known-user ranking, and the
/// favorite-ingredient match count for cold-start ranking. The two scales
/// are not comparable; callers must not mix them.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendation {
    pub recipe_id: i64,
    pub title: String,
    pub score: f64,
}

/// One row of the recipe table.
///
/// List-typed columns arrive in the CSV as Python-literal text and are
/// parsed into real lists at load time; malformed cells become empty lists.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecipeRecord {
    pub id: i64,
    pub name: String,
    pub minutes: i64,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub description: Option<String>,
    pub nutrition: Vec<f64>,
    pub steps: Vec<String>,
    pub n_ingredients: i64,
}

/// Declared preferences of a user with no trained embedding.
#[derive(Debug, Clone, Default)]
pub struct ColdStartProfile {
    pub cuisines: Vec<String>,
    pub diet: String,
    /// Upper bound on cook time, in minutes.
    pub cook_time_max: i64,
    /// Lower-cased favorite ingredients.
    pub favorites: HashSet<String>,
    /// Lower-cased disliked ingredients.
    pub dislikes: HashSet<String>,
}
