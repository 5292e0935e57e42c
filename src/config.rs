use crate::indexer::IndexerOptions;
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of `lsif-moniker.toml`; every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MonikerConfig {
    pub scheme: Option<String>,
    pub language_id: Option<String>,
    pub format: Option<OutputFormat>,
    /// Project root overriding the one recorded in the facts file
    pub root: Option<String>,
}

impl MonikerConfig {
    /// Configuration written by `init`
    pub fn starter() -> Self {
        let defaults = IndexerOptions::default();
        Self {
            scheme: Some(defaults.scheme),
            language_id: Some(defaults.language_id),
            format: Some(OutputFormat::default()),
            root: None,
        }
    }

    /// Indexer options with the configured values applied over the defaults
    pub fn indexer_options(&self) -> IndexerOptions {
        let defaults = IndexerOptions::default();
        IndexerOptions {
            scheme: self.scheme.clone().unwrap_or(defaults.scheme),
            language_id: self.language_id.clone().unwrap_or(defaults.language_id),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("lsif-moniker.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<MonikerConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: MonikerConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &MonikerConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
