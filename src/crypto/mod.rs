//! Cryptographic operations module.
//!
//! RSA key pair generation plus the PKCS#1 v1.5 / SHA-256 signing and
//! verification used for certificate signatures.
//!
//! # Example
//!
//! ```rust,no_run
//! use pkiboot::crypto::rsa_keys::generate_default_rsa_keypair;
//!
//! # fn example() -> pkiboot::error::Result<()> {
//! let keypair = generate_default_rsa_keypair()?;
//! let signature = keypair.sign(b"payload")?;
//! keypair.verify(b"payload", &signature)?;
//! # Ok(())
//! # }
//! ```

pub mod rsa_keys;
