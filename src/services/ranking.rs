use std::cmp::Ordering;

use crate::error::{AppError, AppResult};
use crate::models::Recommendation;
use crate::store::ModelStore;

/// Ranks recipes for a user the model was trained on.
///
/// Runs one forward pass, orders positions by descending score with an
/// ascending-index tie-break so equal scores always come back in the same
/// order, then resolves positions through the store's recipe map. Positions
/// the map does not cover are skipped and do not count toward `top_k`.
/// Recipes without a known title fall back to `Recipe {id}`.
pub fn rank(store: &ModelStore, user_id: i64, top_k: usize) -> AppResult<Vec<Recommendation>> {
    let user_idx = store
        .user_index(user_id)
        .ok_or(AppError::UnknownUser(user_id))?;

    if top_k == 0 {
        return Ok(Vec::new());
    }

    let scores = store.scores(user_idx);

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_unstable_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let mut recommendations = Vec::with_capacity(top_k.min(scores.len()));
    for position in order {
        let Some(recipe_id) = store.recipe_at(position) else {
            continue;
        };
        let title = store
            .title(recipe_id)
            .map(str::to_owned)
            .unwrap_or_else(|| format!("Recipe {recipe_id}"));
        recommendations.push(Recommendation {
            recipe_id,
            title,
            score: f64::from(scores[position]),
        });
        if recommendations.len() == top_k {
            break;
        }
    }

    Ok(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FactorModel;
    use std::collections::HashMap;

    /// Store with one user (id 7 at row 0) whose scores over the three
    /// recipe slots are exactly the item biases.
    fn fixture_store(biases: Vec<f32>, recipe_map: HashMap<i64, usize>) -> ModelStore {
        let n_items = biases.len();
        let model = FactorModel {
            dim: 1,
            user_factors: vec![vec![0.0]],
            item_factors: vec![vec![0.0]; n_items],
            item_bias: biases,
        };
        let titles = HashMap::from([
            (101, "garlic pasta".to_string()),
            (102, "stir fry".to_string()),
            (103, "short ribs".to_string()),
        ]);
        ModelStore::from_parts(model, HashMap::from([(7, 0)]), recipe_map, titles).unwrap()
    }

    fn full_map() -> HashMap<i64, usize> {
        HashMap::from([(101, 0), (102, 1), (103, 2)])
    }

    #[test]
    fn test_rank_returns_top_k_by_descending_score() {
        let store = fixture_store(vec![0.2, 0.9, 0.5], full_map());

        let recs = rank(&store, 7, 2).unwrap();

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].recipe_id, 102);
        assert_eq!(recs[0].title, "stir fry");
        assert!((recs[0].score - 0.9).abs() < 1e-6);
        assert_eq!(recs[1].recipe_id, 103);
        assert!((recs[1].score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rank_unknown_user() {
        let store = fixture_store(vec![0.2, 0.9, 0.5], full_map());

        let err = rank(&store, 9999, 5).unwrap_err();
        assert!(matches!(err, AppError::UnknownUser(9999)));
    }

    #[test]
    fn test_rank_zero_top_k_is_empty() {
        let store = fixture_store(vec![0.2, 0.9, 0.5], full_map());

        assert!(rank(&store, 7, 0).unwrap().is_empty());
    }

    #[test]
    fn test_rank_oversized_top_k_returns_all_valid_positions() {
        let store = fixture_store(vec![0.2, 0.9, 0.5], full_map());

        let recs = rank(&store, 7, 50).unwrap();
        assert_eq!(recs.len(), 3);
    }

    #[test]
    fn test_rank_skips_unmapped_positions_without_counting_them() {
        // Position 1 has the best score but no recipe id; the next two
        // positions must still fill top_k = 2.
        let recipe_map = HashMap::from([(101, 0), (103, 2)]);
        let store = fixture_store(vec![0.2, 0.9, 0.5], recipe_map);

        let recs = rank(&store, 7, 2).unwrap();

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].recipe_id, 103);
        assert_eq!(recs[1].recipe_id, 101);
    }

    #[test]
    fn test_rank_breaks_ties_by_ascending_position() {
        let store = fixture_store(vec![0.5, 0.5, 0.5], full_map());

        let recs = rank(&store, 7, 3).unwrap();

        let ids: Vec<i64> = recs.iter().map(|r| r.recipe_id).collect();
        assert_eq!(ids, vec![101, 102, 103]);
    }

    #[test]
    fn test_rank_is_deterministic() {
        let store = fixture_store(vec![0.5, 0.5, 0.2], full_map());

        let first = rank(&store, 7, 3).unwrap();
        let second = rank(&store, 7, 3).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_rank_falls_back_to_placeholder_title() {
        let model = FactorModel {
            dim: 1,
            user_factors: vec![vec![0.0]],
            item_factors: vec![vec![0.0]],
            item_bias: vec![1.0],
        };
        let store = ModelStore::from_parts(
            model,
            HashMap::from([(7, 0)]),
            HashMap::from([(555, 0)]),
            HashMap::new(),
        )
        .unwrap();

        let recs = rank(&store, 7, 1).unwrap();
        assert_eq!(recs[0].title, "Recipe 555");
    }

    #[test]
    fn test_rank_scores_non_increasing() {
        let store = fixture_store(vec![0.1, 0.7, 0.3], full_map());

        let recs = rank(&store, 7, 3).unwrap();
        for pair in recs.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
