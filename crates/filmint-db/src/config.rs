//! RON configuration for the record store

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where and how the store keeps its database
///
/// ```ron
/// (
///     data_dir: "/var/lib/filmint",
///     name: "filmint-nft-db",
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Directory holding the database file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Database name; the file is `<name>.redb`
    #[serde(default = "default_name")]
    pub name: String,
    /// Keep everything in memory and persist nothing
    #[serde(default)]
    pub in_memory: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_name() -> String {
    "filmint-nft-db".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            name: default_name(),
            in_memory: false,
        }
    }
}

impl StoreConfig {
    /// Persist under `data_dir` with the default name
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Non-persistent store
    pub fn in_memory() -> Self {
        Self {
            in_memory: true,
            ..Default::default()
        }
    }

    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_ron_str(&content)
    }

    /// Parse configuration from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: StoreConfig =
            ron::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        if config.name.trim().is_empty() {
            return Err(Error::Config("database name must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Full path of the database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.redb", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_ron() {
        let config = StoreConfig::from_ron_str("()").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.database_path(), PathBuf::from("./filmint-nft-db.redb"));
    }

    #[test]
    fn test_parse_overrides() {
        let config = StoreConfig::from_ron_str(
            r#"(data_dir: "/tmp/filmint", name: "backup", in_memory: true)"#,
        )
        .unwrap();
        assert!(config.in_memory);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/filmint/backup.redb"));
    }

    #[test]
    fn test_rejects_empty_name() {
        assert!(matches!(
            StoreConfig::from_ron_str(r#"(name: " ")"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.ron");
        fs::write(&path, r#"(name: "from-file")"#).unwrap();

        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.name, "from-file");
        assert!(matches!(
            StoreConfig::load(dir.path().join("missing.ron")),
            Err(Error::Io(_))
        ));
    }
}
