use std::path::Path;
use url::Url;
use crate::error::{Result, AltFillError};

const DB_EXTENSIONS: &[&str] = &["db", "sqlite", "sqlite3"];

/// Checks shared by config loading and CLI arguments
pub struct ConfigValidator;

impl ConfigValidator {
    /// Site URLs must be absolute
    pub fn validate_url(url: &str, field_name: &str) -> Result<()> {
        Url::parse(url).map_err(|e| {
            AltFillError::Validation(format!("Invalid {} URL '{}': {}", field_name, url, e))
        })?;
        Ok(())
    }

    /// Validate numeric range
    pub fn validate_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(AltFillError::Validation(format!(
                "{} must be between {} and {}, got {}",
                field_name, min, max, value
            )));
        }
        Ok(())
    }

    /// Validate an attribute key (non-empty, no whitespace)
    pub fn validate_attribute_key(key: &str, field_name: &str) -> Result<()> {
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(AltFillError::Validation(format!(
                "{} must be a non-empty key without whitespace, got: '{}'",
                field_name, key
            )));
        }
        Ok(())
    }

    /// The content store is SQLite; refuse paths that clearly are not
    pub fn validate_db_path(path: &Path) -> Result<()> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !DB_EXTENSIONS.contains(&ext) {
            return Err(AltFillError::Validation(format!(
                "Database file must end in .{}, got: {}",
                DB_EXTENSIONS.join(", ."),
                path.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_url() {
        assert!(ConfigValidator::validate_url("https://example.com", "site").is_ok());
        assert!(ConfigValidator::validate_url("not-a-url", "site").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(ConfigValidator::validate_range(5usize, 1, 10, "test").is_ok());
        assert!(ConfigValidator::validate_range(15usize, 1, 10, "test").is_err());
        assert!(ConfigValidator::validate_range(0usize, 1, 10, "test").is_err());
    }

    #[test]
    fn test_validate_attribute_key() {
        assert!(ConfigValidator::validate_attribute_key("alt_text", "label_attribute").is_ok());
        assert!(ConfigValidator::validate_attribute_key("", "label_attribute").is_err());
        assert!(ConfigValidator::validate_attribute_key("alt text", "label_attribute").is_err());
    }

    #[test]
    fn test_validate_db_path() {
        assert!(ConfigValidator::validate_db_path(&PathBuf::from("test.db")).is_ok());
        assert!(ConfigValidator::validate_db_path(&PathBuf::from("test.sqlite")).is_ok());
        assert!(ConfigValidator::validate_db_path(&PathBuf::from("test.sqlite3")).is_ok());
        assert!(ConfigValidator::validate_db_path(&PathBuf::from("test.txt")).is_err());
        assert!(ConfigValidator::validate_db_path(&PathBuf::from("test")).is_err());
    }
}
