use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use dagwalk_traverse::TraversalConfig;

/// Looked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = ".dagwalk/config.toml";

/// Settings for the `dagwalk` binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory holding one file per block.
    pub store_dir: PathBuf,
    /// Check fetched blocks against their identifiers.
    pub verify_blocks: bool,
    pub traversal: TraversalConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(".dagwalk/blocks"),
            verify_blocks: false,
            traversal: TraversalConfig::default(),
        }
    }
}

impl CliConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// An explicit path must exist; the default path is optional.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = CliConfig::default();
        assert_eq!(c.store_dir, PathBuf::from(".dagwalk/blocks"));
        assert!(!c.verify_blocks);
        assert_eq!(c.traversal, TraversalConfig::default());
    }

    #[test]
    fn nested_traversal_table() {
        let c = CliConfig::from_toml(
            r#"
            store_dir = "/srv/blocks"
            verify_blocks = true

            [traversal]
            link_budget = 16
            "#,
        )
        .unwrap();
        assert_eq!(c.store_dir, PathBuf::from("/srv/blocks"));
        assert!(c.verify_blocks);
        assert_eq!(c.traversal.link_budget, Some(16));
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(CliConfig::from_toml("").unwrap(), CliConfig::default());
    }

    #[test]
    fn bad_toml_rejected() {
        assert!(CliConfig::from_toml("store_dir = [").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dagwalk.toml");
        fs::write(&path, "verify_blocks = true\n\n[traversal]\nlink_budget = 2\n").unwrap();
        let c = CliConfig::discover(Some(path.as_path())).unwrap();
        assert!(c.verify_blocks);
        assert_eq!(c.traversal.link_budget, Some(2));
    }

    #[test]
    fn explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CliConfig::discover(Some(dir.path().join("nope.toml").as_path())).is_err());
    }
}
