mod model;
mod recipes;

pub use model::{FactorModel, ModelStore};
pub use recipes::RecipeTable;
