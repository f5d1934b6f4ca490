//! `AppConfig` struct and TOML read/write.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// TVMaze settings.
    #[serde(default)]
    pub tvmaze: TvMazeConfig,
    /// TheTVDB settings.
    #[serde(default)]
    pub thetvdb: TheTvdbConfig,
}

/// `[tvmaze]` section.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TvMazeConfig {
    /// API base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// `[thetvdb]` section.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct TheTvdbConfig {
    /// API key. `--api-key` and `TVMETA_THETVDB_API_KEY` take precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// XML mirror override; skips mirror resolution when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Parses an optional URL setting, naming the setting on failure.
fn parse_url(raw: Option<&str>, setting: &str) -> Result<Option<Url>> {
    raw.map(|s| Url::parse(s).with_context(|| format!("invalid {setting}: {s:?}")))
        .transpose()
}

impl TvMazeConfig {
    /// Parsed `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is set but not a valid URL.
    pub fn base_url(&self) -> Result<Option<Url>> {
        parse_url(self.base_url.as_deref(), "[tvmaze] base_url")
    }
}

impl TheTvdbConfig {
    /// Parsed `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is set but not a valid URL.
    pub fn base_url(&self) -> Result<Option<Url>> {
        parse_url(self.base_url.as_deref(), "[thetvdb] base_url")
    }
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert!(config.tvmaze.base_url.is_none());
        assert!(config.thetvdb.api_key.is_none());
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig {
            tvmaze: TvMazeConfig {
                base_url: Some(String::from("http://localhost:8080/")),
            },
            thetvdb: TheTvdbConfig {
                api_key: Some(String::from("ABCDEF0123456789")),
                base_url: None,
            },
        };

        // Act
        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_partial_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[thetvdb]\napi_key = \"KEY\"\n").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.thetvdb.api_key.as_deref(), Some("KEY"));
        assert_eq!(config.tvmaze, TvMazeConfig::default());
    }

    #[test]
    fn test_load_malformed_fails() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tvmaze\n").unwrap();

        // Act
        let result = AppConfig::load(&path);

        // Assert
        assert!(result.unwrap_err().to_string().contains("failed to parse"));
    }

    #[test]
    fn test_base_url_validation() {
        // Arrange
        let good = TvMazeConfig {
            base_url: Some(String::from("http://localhost:8080/")),
        };
        let bad = TheTvdbConfig {
            api_key: None,
            base_url: Some(String::from("not a url")),
        };

        // Act & Assert
        assert_eq!(
            good.base_url().unwrap().unwrap().as_str(),
            "http://localhost:8080/"
        );
        assert!(
            bad.base_url()
                .unwrap_err()
                .to_string()
                .contains("[thetvdb] base_url")
        );
        assert!(TheTvdbConfig::default().base_url().unwrap().is_none());
    }
}
