use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;
use crate::store::RecipeTable;

/// Pre-trained scoring model: one dense factor row per user and per recipe
/// slot, plus a per-slot bias.
///
/// A forward pass for a user is a dot product of their row against every
/// item row; the output vector is indexed by the model's internal recipe
/// indexing, not by recipe id.
#[derive(Debug, Deserialize)]
pub struct FactorModel {
    pub dim: usize,
    pub user_factors: Vec<Vec<f32>>,
    pub item_factors: Vec<Vec<f32>>,
    pub item_bias: Vec<f32>,
}

impl FactorModel {
    pub fn n_users(&self) -> usize {
        self.user_factors.len()
    }

    pub fn n_items(&self) -> usize {
        self.item_factors.len()
    }

    /// One forward pass: the dense per-item score vector for a user row.
    ///
    /// `user_idx` must be below `n_users`; every index in a validated
    /// store's user map satisfies this.
    pub fn scores(&self, user_idx: usize) -> Vec<f32> {
        let user = &self.user_factors[user_idx];
        self.item_factors
            .iter()
            .zip(&self.item_bias)
            .map(|(item, bias)| {
                let dot: f32 = user.iter().zip(item).map(|(u, i)| u * i).sum();
                dot + bias
            })
            .collect()
    }

    /// Checks the shape invariants the rest of the store relies on.
    fn validate(&self) -> Result<(), LoadError> {
        if let Some(row) = self.user_factors.iter().find(|row| row.len() != self.dim) {
            return Err(LoadError::MalformedModel(format!(
                "user factor row has {} values, expected {}",
                row.len(),
                self.dim
            )));
        }
        if let Some(row) = self.item_factors.iter().find(|row| row.len() != self.dim) {
            return Err(LoadError::MalformedModel(format!(
                "item factor row has {} values, expected {}",
                row.len(),
                self.dim
            )));
        }
        if self.item_bias.len() != self.item_factors.len() {
            return Err(LoadError::MalformedModel(format!(
                "bias vector has {} entries for {} item rows",
                self.item_bias.len(),
                self.item_factors.len()
            )));
        }
        Ok(())
    }
}

/// Long-lived, read-only serving state: the model plus the mappings needed
/// to translate its output vector back into recipe ids and titles.
///
/// Built once at startup and shared by reference across request handlers;
/// nothing here is mutated after construction.
#[derive(Debug)]
pub struct ModelStore {
    model: FactorModel,
    user_index: HashMap<i64, usize>,
    sorted_user_ids: Vec<i64>,
    recipe_index: HashMap<usize, i64>,
    recipe_title: HashMap<i64, String>,
}

impl ModelStore {
    /// Loads the model artifact and id maps from disk; titles come from the
    /// already-loaded recipe table. Any failure here is fatal.
    pub fn load(
        model_path: impl AsRef<Path>,
        user_map_path: impl AsRef<Path>,
        recipe_map_path: impl AsRef<Path>,
        table: &RecipeTable,
    ) -> Result<Self, LoadError> {
        let model: FactorModel = read_json(model_path.as_ref())?;
        let user_index: HashMap<i64, usize> = read_json(user_map_path.as_ref())?;
        let recipe_map: HashMap<i64, usize> = read_json(recipe_map_path.as_ref())?;
        Self::from_parts(model, user_index, recipe_map, table.titles())
    }

    /// Builds a store from already-deserialized parts, enforcing the load
    /// invariants: model shape, user rows in range, and an invertible
    /// recipe map.
    pub fn from_parts(
        model: FactorModel,
        user_index: HashMap<i64, usize>,
        recipe_map: HashMap<i64, usize>,
        recipe_title: HashMap<i64, String>,
    ) -> Result<Self, LoadError> {
        model.validate()?;

        for (&user_id, &index) in &user_index {
            if index >= model.n_users() {
                return Err(LoadError::UserIndexOutOfRange {
                    user_id,
                    index,
                    n_users: model.n_users(),
                });
            }
        }

        // The artifact stores id -> index; ranking needs the inverse, and
        // the inverse only exists if the map is injective.
        let mut recipe_index = HashMap::with_capacity(recipe_map.len());
        for (recipe_id, index) in recipe_map {
            if let Some(previous) = recipe_index.insert(index, recipe_id) {
                let (first, second) = if previous < recipe_id {
                    (previous, recipe_id)
                } else {
                    (recipe_id, previous)
                };
                return Err(LoadError::DuplicateRecipeIndex {
                    index,
                    first,
                    second,
                });
            }
        }

        let mut sorted_user_ids: Vec<i64> = user_index.keys().copied().collect();
        sorted_user_ids.sort_unstable();

        Ok(Self {
            model,
            user_index,
            sorted_user_ids,
            recipe_index,
            recipe_title,
        })
    }

    pub fn user_count(&self) -> usize {
        self.user_index.len()
    }

    /// Known user ids in ascending order.
    pub fn user_ids(&self) -> &[i64] {
        &self.sorted_user_ids
    }

    pub fn user_index(&self, user_id: i64) -> Option<usize> {
        self.user_index.get(&user_id).copied()
    }

    /// Runs the forward pass for a user row.
    pub fn scores(&self, user_idx: usize) -> Vec<f32> {
        self.model.scores(user_idx)
    }

    /// Resolves a position of the score vector to a recipe id, if the
    /// model's recipe map covers it.
    pub fn recipe_at(&self, position: usize) -> Option<i64> {
        self.recipe_index.get(&position).copied()
    }

    pub fn title(&self, recipe_id: i64) -> Option<&str> {
        self.recipe_title.get(&recipe_id).map(String::as_str)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::io(path, source))?;
    serde_json::from_str(&raw).map_err(|source| LoadError::parse(path, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_model() -> FactorModel {
        FactorModel {
            dim: 2,
            user_factors: vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            item_factors: vec![vec![0.5, 0.5], vec![1.0, 0.0], vec![0.0, 2.0]],
            item_bias: vec![0.25, 0.0, -0.5],
        }
    }

    fn titles() -> HashMap<i64, String> {
        HashMap::from([
            (101, "garlic pasta".to_string()),
            (102, "stir fry".to_string()),
            (103, "short ribs".to_string()),
        ])
    }

    #[test]
    fn test_scores_dot_product_plus_bias() {
        let model = small_model();
        let scores = model.scores(0);
        assert_eq!(scores, vec![0.75, 1.0, -0.5]);

        let scores = model.scores(1);
        assert_eq!(scores, vec![0.75, 0.0, 1.5]);
    }

    #[test]
    fn test_from_parts_inverts_recipe_map() {
        let user_index = HashMap::from([(7, 0), (8, 1)]);
        let recipe_map = HashMap::from([(101, 0), (102, 1), (103, 2)]);

        let store = ModelStore::from_parts(small_model(), user_index, recipe_map, titles()).unwrap();

        assert_eq!(store.recipe_at(0), Some(101));
        assert_eq!(store.recipe_at(1), Some(102));
        assert_eq!(store.recipe_at(2), Some(103));
        assert_eq!(store.recipe_at(3), None);
        assert_eq!(store.title(102), Some("stir fry"));
    }

    #[test]
    fn test_from_parts_rejects_duplicate_index() {
        let user_index = HashMap::from([(7, 0)]);
        // Two recipes claim position 1
        let recipe_map = HashMap::from([(101, 0), (102, 1), (103, 1)]);

        let err = ModelStore::from_parts(small_model(), user_index, recipe_map, titles())
            .unwrap_err();

        match err {
            LoadError::DuplicateRecipeIndex {
                index,
                first,
                second,
            } => {
                assert_eq!(index, 1);
                assert_eq!((first, second), (102, 103));
            }
            other => panic!("expected DuplicateRecipeIndex, got {other:?}"),
        }
    }

    #[test]
    fn test_from_parts_rejects_out_of_range_user_row() {
        let user_index = HashMap::from([(7, 5)]);
        let recipe_map = HashMap::from([(101, 0)]);

        let err = ModelStore::from_parts(small_model(), user_index, recipe_map, titles())
            .unwrap_err();

        assert!(matches!(
            err,
            LoadError::UserIndexOutOfRange {
                user_id: 7,
                index: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_rejects_ragged_factors() {
        let model = FactorModel {
            dim: 2,
            user_factors: vec![vec![1.0, 0.0], vec![0.0]],
            item_factors: vec![vec![0.5, 0.5]],
            item_bias: vec![0.0],
        };

        let err =
            ModelStore::from_parts(model, HashMap::new(), HashMap::new(), HashMap::new())
                .unwrap_err();
        assert!(matches!(err, LoadError::MalformedModel(_)));
    }

    #[test]
    fn test_validate_rejects_bias_length_mismatch() {
        let model = FactorModel {
            dim: 1,
            user_factors: vec![vec![1.0]],
            item_factors: vec![vec![0.5], vec![0.7]],
            item_bias: vec![0.0],
        };

        let err =
            ModelStore::from_parts(model, HashMap::new(), HashMap::new(), HashMap::new())
                .unwrap_err();
        assert!(matches!(err, LoadError::MalformedModel(_)));
    }

    #[test]
    fn test_user_ids_sorted() {
        let user_index = HashMap::from([(42, 0), (7, 1), (19, 0)]);
        let store = ModelStore::from_parts(small_model(), user_index, HashMap::new(), titles())
            .unwrap();

        assert_eq!(store.user_ids(), &[7, 19, 42]);
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();

        let model_path = dir.path().join("model.json");
        let user_map_path = dir.path().join("user_map.json");
        let recipe_map_path = dir.path().join("recipe_map.json");

        std::fs::write(
            &model_path,
            r#"{"dim": 1, "user_factors": [[1.0]], "item_factors": [[0.9]], "item_bias": [0.0]}"#,
        )
        .unwrap();
        std::fs::write(&user_map_path, r#"{"7": 0}"#).unwrap();
        std::fs::write(&recipe_map_path, r#"{"101": 0}"#).unwrap();

        let table = RecipeTable::from_records(vec![]);
        let store = ModelStore::load(&model_path, &user_map_path, &recipe_map_path, &table)
            .unwrap();

        assert_eq!(store.user_index(7), Some(0));
        assert_eq!(store.recipe_at(0), Some(101));
        // No titles in an empty table; ranking falls back to a placeholder.
        assert_eq!(store.title(101), None);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let table = RecipeTable::from_records(vec![]);

        let err = ModelStore::load(
            dir.path().join("missing.json"),
            dir.path().join("missing.json"),
            dir.path().join("missing.json"),
            &table,
        )
        .unwrap_err();

        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_corrupt_artifact_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        std::fs::write(&model_path, "not json").unwrap();

        let table = RecipeTable::from_records(vec![]);
        let err = ModelStore::load(&model_path, &model_path, &model_path, &table).unwrap_err();

        assert!(matches!(err, LoadError::Parse { .. }));
    }
}
