use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use tracing::warn;

use crate::error::{ConfigError, Result};

pub mod env;
pub mod validation;

pub use env::{EnvParser, EnvVars};
pub use validation::ConfigValidator;

pub const DEFAULT_LIMIT_MIN: usize = 1;
pub const DEFAULT_LIMIT_MAX: usize = 1000;

fn default_site_url() -> String {
    "http://localhost".to_string()
}

fn default_uploads_path() -> String {
    "/uploads".to_string()
}

fn default_label_attribute() -> String {
    "alt_text".to_string()
}

fn default_featured_attribute() -> String {
    "featured_asset".to_string()
}

fn default_embed_marker_prefix() -> String {
    "wp-image-".to_string()
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Content database file path
    pub database_path: PathBuf,

    /// Public site URL used to resolve asset URLs
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Path under the site URL where uploaded files are served
    #[serde(default = "default_uploads_path")]
    pub uploads_path: String,

    /// Attribute key holding an asset's ALT text
    #[serde(default = "default_label_attribute")]
    pub label_attribute: String,

    /// Attribute key holding a content record's featured asset id
    #[serde(default = "default_featured_attribute")]
    pub featured_attribute: String,

    /// Marker prefix that embeds an asset id in body text
    #[serde(default = "default_embed_marker_prefix")]
    pub embed_marker_prefix: String,

    /// Default number of assets listed per page
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        let default_data_path = match ProjectDirs::from("net", "altfill", "altfill-cli") {
            Some(project_dirs) => project_dirs.data_dir().to_path_buf(),
            None => {
                warn!("ProjectDirs unavailable; falling back to current directory for data path");
                PathBuf::from(".")
            }
        };

        Self {
            database_path: default_data_path.join("altfill.db"),
            site_url: default_site_url(),
            uploads_path: default_uploads_path(),
            label_attribute: default_label_attribute(),
            featured_attribute: default_featured_attribute(),
            embed_marker_prefix: default_embed_marker_prefix(),
            default_limit: default_limit(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        let config_file = if let Some(path) = config_path {
            PathBuf::from(path)
        } else {
            Self::default_config_path()?
        };

        if config_file.exists() {
            let content = fs::read_to_string(&config_file)?;
            config = toml::from_str(&content)?;
        }

        // Environment wins over the file
        config.load_from_env()?;
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            fs::create_dir_all(parent)?;
        }

        if !config_file.exists() {
            if let Some(parent) = config_file.parent() {
                fs::create_dir_all(parent)?;
            }
            config.save(&config_file)?;
        }

        Ok(config)
    }

    fn load_from_env(&mut self) -> Result<()> {
        if let Some(path) = EnvParser::parse_path(EnvVars::DATABASE_PATH)? {
            self.database_path = path;
        }

        if let Some(site_url) = EnvParser::parse_string(EnvVars::SITE_URL, Some(validate_site_url))? {
            self.site_url = site_url;
        }

        if let Some(uploads_path) = EnvParser::parse_string(EnvVars::UPLOADS_PATH, None)? {
            self.uploads_path = uploads_path;
        }

        if let Some(key) = EnvParser::parse_string(EnvVars::LABEL_ATTRIBUTE, None)? {
            self.label_attribute = key;
        }

        if let Some(key) = EnvParser::parse_string(EnvVars::FEATURED_ATTRIBUTE, None)? {
            self.featured_attribute = key;
        }

        if let Some(prefix) = EnvParser::parse_string(EnvVars::EMBED_MARKER_PREFIX, None)? {
            self.embed_marker_prefix = prefix;
        }

        if let Some(limit) = EnvParser::parse_usize(EnvVars::DEFAULT_LIMIT, DEFAULT_LIMIT_MIN, DEFAULT_LIMIT_MAX)? {
            self.default_limit = limit;
        }

        Ok(())
    }

    /// Check values that may have come from a hand-edited file
    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate_url(&self.site_url, "site")?;
        ConfigValidator::validate_db_path(&self.database_path)?;
        ConfigValidator::validate_range(self.default_limit, DEFAULT_LIMIT_MIN, DEFAULT_LIMIT_MAX, "default_limit")?;
        ConfigValidator::validate_attribute_key(&self.label_attribute, "label_attribute")?;
        ConfigValidator::validate_attribute_key(&self.featured_attribute, "featured_attribute")?;

        if self.label_attribute == self.featured_attribute {
            return Err(ConfigError::InvalidValue {
                field: "featured_attribute".to_string(),
                value: self.featured_attribute.clone(),
            }
            .into());
        }

        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn default_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("net", "altfill", "altfill-cli")
            .ok_or(ConfigError::NoProjectDirs)?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Self::default_config_path()
    }
}

fn validate_site_url(value: &str) -> Result<()> {
    ConfigValidator::validate_url(value, "site")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.label_attribute, "alt_text");
        assert_eq!(config.embed_marker_prefix, "wp-image-");
        assert_eq!(config.default_limit, 50);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let content = r#"
            database_path = "/tmp/site.db"
            site_url = "https://example.com"
        "#;
        let config: Config = toml::from_str(content).unwrap();
        assert_eq!(config.site_url, "https://example.com");
        assert_eq!(config.uploads_path, "/uploads");
        assert_eq!(config.featured_attribute, "featured_asset");
    }

    #[test]
    fn test_same_attribute_keys_rejected() {
        let config = Config {
            featured_attribute: "alt_text".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_limit_out_of_range_rejected() {
        let config = Config {
            default_limit: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
