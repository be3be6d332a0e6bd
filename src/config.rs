// ⚙️ Configuration - optional TOML file in the platform config directory

use crate::ids::IdStrategy;
use crate::storage::STORAGE_KEY;
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";
pub const DATABASE_FILE: &str = "expenses.db";
pub const LOG_FILE: &str = "expense-tracker.log";

fn default_storage_key() -> String {
    STORAGE_KEY.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Defaults to `<data dir>/expenses.db`
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default)]
    pub id_strategy: IdStrategy,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: None,
            storage_key: default_storage_key(),
            id_strategy: IdStrategy::default(),
            log_level: default_log_level(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "expense-tracker", "expense-tracker")
        .ok_or_else(|| anyhow!("Could not determine home directory"))
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf> {
    if !path.exists() {
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(path)
}

pub fn data_dir() -> Result<PathBuf> {
    ensure_dir(project_dirs()?.data_dir().to_path_buf())
}

pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
}

impl Config {
    /// Load from the default location; a missing file means defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(DATABASE_FILE)),
        }
    }

    /// Unknown names fall back to `info`
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.storage_key, "expenses-v1");
        assert_eq!(config.id_strategy, IdStrategy::Uuid);
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::parse(
            r#"
            database_path = "/tmp/my-expenses.db"
            storage_key = "expenses-v2"
            id_strategy = "timestamp"
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/my-expenses.db"));
        assert_eq!(config.storage_key, "expenses-v2");
        assert_eq!(config.id_strategy, IdStrategy::Timestamp);
        assert_eq!(config.level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_bad_values_are_errors() {
        assert!(Config::parse("id_strategy = \"random\"").is_err());
        assert!(Config::parse("storage_key = ").is_err());
    }

    #[test]
    fn test_unknown_log_level_falls_back() {
        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("no-such-expense-config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
