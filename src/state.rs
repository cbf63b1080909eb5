use std::sync::Arc;

use crate::config::Config;
use crate::error::LoadError;
use crate::store::{ModelStore, RecipeTable};

/// Shared application state: the model store and the recipe table, built
/// once at startup and shared read-only across request handlers. Concurrent
/// reads need no locking.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ModelStore>,
    pub recipes: Arc<RecipeTable>,
}

impl AppState {
    /// Loads every artifact named in the configuration. A failure here is
    /// fatal; the server must not start without a complete store.
    pub fn load(config: &Config) -> Result<Self, LoadError> {
        let recipes = RecipeTable::load(&config.recipe_csv_path)?;
        let store = ModelStore::load(
            &config.model_path,
            &config.user_map_path,
            &config.recipe_map_path,
            &recipes,
        )?;

        Ok(Self::from_parts(store, recipes))
    }

    /// Builds state from already-constructed components.
    pub fn from_parts(store: ModelStore, recipes: RecipeTable) -> Self {
        Self {
            store: Arc::new(store),
            recipes: Arc::new(recipes),
        }
    }
}
