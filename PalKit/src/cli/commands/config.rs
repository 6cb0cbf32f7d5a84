//! CLI command for showing the effective configuration

use std::path::Path;

use crate::extract::ExtractConfig;

/// Print the configuration that `extract` would use
pub fn execute(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = ExtractConfig::load_or_default(config_path)?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
