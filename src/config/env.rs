use std::env;
use std::path::PathBuf;
use crate::error::{Result, AltFillError};

pub struct EnvVars;

impl EnvVars {
    pub const DATABASE_PATH: &'static str = "ALTFILL_DATABASE_PATH";
    pub const SITE_URL: &'static str = "ALTFILL_SITE_URL";
    pub const UPLOADS_PATH: &'static str = "ALTFILL_UPLOADS_PATH";
    pub const LABEL_ATTRIBUTE: &'static str = "ALTFILL_LABEL_ATTRIBUTE";
    pub const FEATURED_ATTRIBUTE: &'static str = "ALTFILL_FEATURED_ATTRIBUTE";
    pub const EMBED_MARKER_PREFIX: &'static str = "ALTFILL_EMBED_MARKER_PREFIX";
    pub const DEFAULT_LIMIT: &'static str = "ALTFILL_DEFAULT_LIMIT";
}

/// Reads ALTFILL_* overrides. Blank values count as unset.
pub struct EnvParser;

impl EnvParser {
    pub fn parse_string(var_name: &str, validator: Option<fn(&str) -> Result<()>>) -> Result<Option<String>> {
        match env::var(var_name) {
            Ok(value) => {
                let trimmed = value.trim().to_string();
                if trimmed.is_empty() {
                    return Ok(None);
                }

                if let Some(validate_fn) = validator {
                    validate_fn(&trimmed)?;
                }

                Ok(Some(trimmed))
            }
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                Err(AltFillError::Validation(format!(
                    "Environment variable {} contains invalid UTF-8",
                    var_name
                )))
            }
        }
    }

    pub fn parse_path(var_name: &str) -> Result<Option<PathBuf>> {
        Ok(Self::parse_string(var_name, None)?.map(PathBuf::from))
    }

    /// Integer setting; out-of-range values are an error, not clamped
    pub fn parse_usize(var_name: &str, min: usize, max: usize) -> Result<Option<usize>> {
        let Some(raw) = Self::parse_string(var_name, None)? else {
            return Ok(None);
        };

        match raw.parse::<usize>() {
            Ok(value) if (min..=max).contains(&value) => Ok(Some(value)),
            _ => Err(AltFillError::Validation(format!(
                "{} must be an integer between {} and {}, got '{}'",
                var_name, min, max, raw
            ))),
        }
    }

    /// Every ALTFILL_* variable currently set
    pub fn get_all_altfill_vars() -> Vec<(String, String)> {
        env::vars()
            .filter(|(key, _)| key.starts_with("ALTFILL_"))
            .collect()
    }
}
