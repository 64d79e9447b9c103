//! pkiboot: bootstrap a minimal PKI for mutual TLS test deployments
//!
//! This library generates an RSA root certificate authority, then uses it to
//! issue one server certificate and any number of client certificates. Every
//! key and certificate is written to a destination directory as PEM.
//!
//! # Architecture
//!
//! Operations are composed from small functions that each return `Result`:
//!
//! - [`crypto::rsa_keys`] generates RSA key pairs
//! - [`cert::ca`] and [`cert::entity`] build the self-signed root and the
//!   leaf certificates it issues
//! - [`storage::pem_writer`] persists keys and certificates
//! - [`bootstrap`] runs the root, server and client phases in order
//!
//! # Example
//!
//! ```rust,no_run
//! use pkiboot::bootstrap::bootstrap;
//! use pkiboot::error::Result;
//! use std::path::Path;
//!
//! fn example() -> Result<()> {
//!     bootstrap("Root", "Server", &["alice", "bob"], Path::new("certificates"))?;
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod cert;
pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use bootstrap::{bootstrap, bootstrap_with_config};
pub use config::PkiConfig;
pub use error::{PkiError, Result};
