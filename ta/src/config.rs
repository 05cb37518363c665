//! Configuration for triparchive

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the trip history JSON file
    #[serde(default = "crate::default_archive_path", rename = "archive-path")]
    pub archive_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_path: crate::default_archive_path(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_from_file(config_path);
        }

        let default_paths = [
            dirs::config_dir().map(|p| p.join("tripgenie").join("triparchive.yml")),
            Some(PathBuf::from("triparchive.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        Ok(Config::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_path_ends_with_history_file() {
        let config = Config::default();
        assert!(config.archive_path.ends_with("trip_history.json"));
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("triparchive.yml");
        std::fs::write(&config_path, "archive-path: /srv/trips/history.json\n").unwrap();

        let loaded = Config::load(Some(&config_path)).unwrap();

        assert_eq!(loaded.archive_path, PathBuf::from("/srv/trips/history.json"));
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.archive_path, crate::default_archive_path());
    }
}
