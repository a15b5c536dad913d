use std::path::Path;

use anyhow::{Context, Result};

use super::Config;

/// Project-level config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".lmrun.yaml";

/// Load config from `.lmrun.yaml` in `dir`, falling back to defaults when the
/// file does not exist.
pub fn load(dir: &Path) -> Result<Config> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    load_file(&path)
}

/// Load config from an explicit path. The file must exist.
pub fn load_file(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&contents)
        .with_context(|| format!("invalid config file {}", path.display()))?;
    Ok(config)
}
