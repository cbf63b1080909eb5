use crate::models::{ColdStartProfile, Recommendation, RecipeRecord};
use crate::store::RecipeTable;

/// Ranks recipes for a user with no trained embedding.
///
/// Rule-based pipeline over the recipe table, narrowing the candidate set
/// step by step: cook-time cap, diet tag match, cuisine tag match,
/// favorite-ingredient count, dislike exclusion, then a stable sort by
/// match count (table order is preserved on ties).
///
/// The returned `score` is the favorite-ingredient match count cast to a
/// float; it is not on the same scale as the learned scores from
/// [`crate::services::ranking::rank`].
pub fn cold_start_rank(
    table: &RecipeTable,
    profile: &ColdStartProfile,
    top_k: usize,
) -> Vec<Recommendation> {
    let diet = profile.diet.trim().to_lowercase();
    let cuisines: Vec<String> = profile
        .cuisines
        .iter()
        .map(|cuisine| cuisine.trim().to_lowercase())
        .filter(|cuisine| !cuisine.is_empty())
        .collect();

    let mut candidates: Vec<(&RecipeRecord, usize)> = Vec::new();
    for recipe in table.iter() {
        if recipe.minutes > profile.cook_time_max {
            continue;
        }
        if !diet.is_empty() && !any_tag_contains(&recipe.tags, std::slice::from_ref(&diet)) {
            continue;
        }
        if !cuisines.is_empty() && !any_tag_contains(&recipe.tags, &cuisines) {
            continue;
        }

        let fav_match = favorite_matches(recipe, profile);

        if has_disliked_ingredient(recipe, profile) {
            continue;
        }

        candidates.push((recipe, fav_match));
    }

    // Stable sort: equal match counts keep table order.
    candidates.sort_by_key(|&(_, fav_match)| std::cmp::Reverse(fav_match));

    candidates
        .into_iter()
        .take(top_k)
        .map(|(recipe, fav_match)| Recommendation {
            recipe_id: recipe.id,
            title: recipe.name.clone(),
            score: fav_match as f64,
        })
        .collect()
}

/// True when some tag case-insensitively contains some needle. Needles must
/// already be lower-cased.
fn any_tag_contains(tags: &[String], needles: &[String]) -> bool {
    tags.iter().any(|tag| {
        let tag = tag.to_lowercase();
        needles.iter().any(|needle| tag.contains(needle.as_str()))
    })
}

fn favorite_matches(recipe: &RecipeRecord, profile: &ColdStartProfile) -> usize {
    if profile.favorites.is_empty() {
        return 0;
    }
    recipe
        .ingredients
        .iter()
        .filter(|ingredient| profile.favorites.contains(&ingredient.to_lowercase()))
        .count()
}

fn has_disliked_ingredient(recipe: &RecipeRecord, profile: &ColdStartProfile) -> bool {
    if profile.dislikes.is_empty() {
        return false;
    }
    recipe
        .ingredients
        .iter()
        .any(|ingredient| profile.dislikes.contains(&ingredient.to_lowercase()))
}
