//! Bootstrap configuration.
//!
//! [`PkiConfig`] is built once at startup, either from its defaults or from
//! a JSON file that overrides any subset of fields, and then only read.

use crate::cert::identity::DEFAULT_ORGANIZATION;
use crate::crypto::rsa_keys::{DEFAULT_KEY_SIZE, DEFAULT_PUBLIC_EXPONENT, MIN_KEY_SIZE};
use crate::error::{PkiError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default certificate lifetime in days.
pub const DEFAULT_DAYS_VALID: u32 = 365;

/// Key, validity and naming parameters shared by every principal.
///
/// # Example
///
/// ```
/// use pkiboot::config::PkiConfig;
///
/// let config: PkiConfig = serde_json::from_str(r#"{"days_valid": 30}"#).unwrap();
/// assert_eq!(config.days_valid, 30);
/// assert_eq!(config.key_size, 2048);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PkiConfig {
    /// RSA modulus size in bits (default 2048).
    pub key_size: usize,

    /// RSA public exponent (default 65537).
    pub public_exponent: u64,

    /// Lifetime of every certificate in days (default 365).
    pub days_valid: u32,

    /// Organization placed in every subject (default "Test, Inc.").
    pub organization: String,
}

impl Default for PkiConfig {
    fn default() -> Self {
        Self {
            key_size: DEFAULT_KEY_SIZE,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
            days_valid: DEFAULT_DAYS_VALID,
            organization: DEFAULT_ORGANIZATION.to_string(),
        }
    }
}

impl PkiConfig {
    /// Defaults, overridden by the JSON file at `path` when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let contents = fs::read_to_string(path).map_err(|e| PkiError::io(path, e))?;
                serde_json::from_str(&contents).map_err(|e| {
                    PkiError::ConfigError(format!("Invalid config {}: {}", path.display(), e))
                })?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would fail later in the run.
    pub fn validate(&self) -> Result<()> {
        if self.key_size < MIN_KEY_SIZE {
            return Err(PkiError::ConfigError(format!(
                "key_size {} is below the minimum of {}",
                self.key_size, MIN_KEY_SIZE
            )));
        }
        if self.public_exponent < 3 || self.public_exponent % 2 == 0 {
            return Err(PkiError::ConfigError(format!(
                "public_exponent {} must be odd and at least 3",
                self.public_exponent
            )));
        }
        if self.days_valid == 0 {
            return Err(PkiError::ConfigError(
                "days_valid must be greater than zero".to_string(),
            ));
        }
        if self.organization.is_empty() {
            return Err(PkiError::ConfigError(
                "organization cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PkiConfig::default();
        assert_eq!(config.key_size, 2048);
        assert_eq!(config.public_exponent, 65537);
        assert_eq!(config.days_valid, 365);
        assert_eq!(config.organization, "Test, Inc.");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_without_file() {
        assert_eq!(PkiConfig::load(None).unwrap(), PkiConfig::default());
    }

    #[test]
    fn test_load_partial_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pki.json");
        fs::write(&path, r#"{"days_valid": 90, "organization": "Acme"}"#).unwrap();

        let config = PkiConfig::load(Some(&path)).unwrap();
        assert_eq!(config.days_valid, 90);
        assert_eq!(config.organization, "Acme");
        assert_eq!(config.key_size, 2048);
    }

    #[test]
    fn test_load_rejects_unknown_field() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pki.json");
        fs::write(&path, r#"{"hostname": "0.0.0.0"}"#).unwrap();

        let result = PkiConfig::load(Some(&path));
        assert!(matches!(result, Err(PkiError::ConfigError(_))));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pki.json");
        fs::write(&path, r#"{"days_valid": 0}"#).unwrap();

        let result = PkiConfig::load(Some(&path));
        assert!(matches!(result, Err(PkiError::ConfigError(_))));
    }

    #[test]
    fn test_validate_even_exponent() {
        let config = PkiConfig {
            public_exponent: 4,
            ..PkiConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = PkiConfig::load(Some(Path::new("/nonexistent/pki.json")));
        assert!(matches!(result, Err(PkiError::IoError { .. })));
    }
}
