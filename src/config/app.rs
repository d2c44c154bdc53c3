use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use super::engine::EngineConfig;

/// Prefix for environment overrides, e.g. `DRAW_FORECAST__DATABASE__URL`.
pub const ENV_PREFIX: &str = "DRAW_FORECAST";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Optional JSON file with catalog labels; the built-in catalog is used otherwise.
    pub catalog_path: Option<String>,
    pub database: DatabaseSettings,
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite:./draws.db".to_string(),
            max_connections: 5,
        }
    }
}

impl AppConfig {
    /// Layer the TOML file (if present) and `DRAW_FORECAST__*` variables
    /// over the defaults, then validate the engine section.
    pub fn load(path: &str) -> Result<Self> {
        let file_present = Path::new(path).exists();
        if file_present {
            info!("Loading configuration from {}", path);
        } else {
            debug!("No configuration file at {}, using defaults", path);
        }

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let app: AppConfig = settings.try_deserialize()?;
        app.engine
            .validate()
            .map_err(|errors| anyhow!("invalid engine configuration: {}", errors.join(", ")))?;

        Ok(app)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
