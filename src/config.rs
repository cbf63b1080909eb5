use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the serialized factor model artifact
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Path to the user id -> model row mapping
    #[serde(default = "default_user_map_path")]
    pub user_map_path: String,

    /// Path to the recipe id -> model column mapping
    #[serde(default = "default_recipe_map_path")]
    pub recipe_map_path: String,

    /// Path to the recipe table CSV
    #[serde(default = "default_recipe_csv_path")]
    pub recipe_csv_path: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_model_path() -> String {
    "artifacts/recipe_model.json".to_string()
}

fn default_user_map_path() -> String {
    "artifacts/user_map.json".to_string()
}

fn default_recipe_map_path() -> String {
    "artifacts/recipe_map.json".to_string()
}

fn default_recipe_csv_path() -> String {
    "artifacts/recipes.csv".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
