//! Output file layout.
//!
//! Fixed file names inside the destination directory:
//!
//! - `root_certificate.pem`, `root_key.pem`
//! - `server_certificate.pem`, `server_key.pem`
//! - `client_certificate_<cn>.pem`, `client_key_<cn>.pem`

use crate::error::{PkiError, Result};
use std::path::{Path, PathBuf};

/// Directory name used when no destination is given.
pub const DEFAULT_DESTINATION_DIR: &str = "certificates";

/// Whose key and certificate a pair of files holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Root,
    Server,
    Client(String),
}

impl Principal {
    pub fn certificate_file_name(&self) -> String {
        match self {
            Principal::Root => "root_certificate.pem".to_string(),
            Principal::Server => "server_certificate.pem".to_string(),
            Principal::Client(cn) => format!("client_certificate_{}.pem", cn),
        }
    }

    pub fn key_file_name(&self) -> String {
        match self {
            Principal::Root => "root_key.pem".to_string(),
            Principal::Server => "server_key.pem".to_string(),
            Principal::Client(cn) => format!("client_key_{}.pem", cn),
        }
    }

    pub fn certificate_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.certificate_file_name())
    }

    pub fn key_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.key_file_name())
    }
}

/// Reject common names that cannot be embedded verbatim in a file name.
///
/// Empty names, `.` and `..`, path separators, NUL and other control
/// characters are refused. Everything else is kept as-is.
pub fn validate_file_component(common_name: &str) -> Result<()> {
    let reason = if common_name.is_empty() {
        Some("is empty")
    } else if common_name == "." || common_name == ".." {
        Some("is a relative path component")
    } else if common_name.contains(['/', '\\']) {
        Some("contains a path separator")
    } else if common_name.chars().any(char::is_control) {
        Some("contains a control character")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(PkiError::InvalidCommonName(format!(
            "{:?} {}",
            common_name, reason
        ))),
        None => Ok(()),
    }
}
