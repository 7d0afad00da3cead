mod types;

pub use types::*;

use crate::{Error, Result};
use std::{env, path::Path};
use tracing::debug;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the YAML file (if any) and layers the process environment on top.
///
/// An explicit `CONFIG_PATH` must exist; the default `config.yaml` is optional.
pub async fn load() -> Result<Config> {
    let mut config = match env::var("CONFIG_PATH") {
        Ok(path) => read_file(&path).await?,
        Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => read_file(DEFAULT_CONFIG_PATH).await?,
        Err(_) => {
            debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
            Config::default()
        }
    };

    apply_env(&mut config, |key| env::var(key).ok())?;

    Ok(config)
}

async fn read_file(config_path: &str) -> Result<Config> {
    debug!("Loading configuration from: {}", config_path);

    let config_str = tokio::fs::read_to_string(config_path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}

/// Overrides file values with `PORT`, `STABILITY_API_KEY`, `STABILITY_ENGINE`
/// and `STABILITY_API_BASE`. Empty values are treated as unset.
pub fn apply_env<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(port) = var("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("Invalid PORT: '{}'", port)))?;
    }
    if let Some(api_key) = var("STABILITY_API_KEY") {
        config.stability.api_key = Some(api_key);
    }
    if let Some(engine) = var("STABILITY_ENGINE") {
        config.stability.engine = engine;
    }
    if let Some(base_url) = var("STABILITY_API_BASE") {
        config.stability.base_url = base_url;
    }

    // A blank key in the YAML file is as good as none
    if config
        .stability
        .api_key
        .as_deref()
        .is_some_and(|key| key.trim().is_empty())
    {
        config.stability.api_key = None;
    }

    Ok(())
}
