//! Error types for the pkiboot library.
//!
//! Every failure aborts the bootstrap run, so each variant carries enough
//! context (common name, parameter or path) to diagnose the problem.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for pkiboot operations.
#[derive(Error, Debug)]
pub enum PkiError {
    /// RSA key generation rejected the parameters or ran out of entropy
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// Certificate construction or signing failed
    #[error("Certificate build error: {0}")]
    CertificateBuildError(String),

    /// The output directory does not exist
    #[error("Destination directory not found: {}", .0.display())]
    DestinationNotFoundError(PathBuf),

    /// Filesystem failure while writing or reading an artifact
    #[error("I/O error at {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A common name cannot be used as a file name fragment
    #[error("Invalid common name: {0}")]
    InvalidCommonName(String),

    /// Configuration file could not be parsed or holds invalid values
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A certificate failed a signature or extension check
    #[error("Verification error: {0}")]
    VerificationError(String),

    /// PEM encoding/decoding error
    #[error("PEM error: {0}")]
    PemError(String),
}

impl PkiError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PkiError::IoError {
            path: path.into(),
            source,
        }
    }
}

/// A specialized Result type for pkiboot operations.
pub type Result<T> = std::result::Result<T, PkiError>;
