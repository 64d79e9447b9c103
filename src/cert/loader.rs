//! Certificate and key loading from PEM files.
//!
//! Reads back the artifacts written by [`crate::storage::pem_writer`].

use crate::cert::certificate::Certificate;
use crate::crypto::rsa_keys::KeyPair;
use crate::error::{PkiError, Result};
use rsa::pkcs8::DecodePrivateKey;
use rsa::RsaPrivateKey;
use rustls_pemfile::Item;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Load the first certificate from a PEM string.
///
/// # Example
///
/// ```rust,no_run
/// use pkiboot::cert::loader::load_certificate_from_pem;
///
/// # fn example() -> pkiboot::error::Result<()> {
/// let pem = std::fs::read_to_string("root_certificate.pem").unwrap();
/// let cert = load_certificate_from_pem(&pem)?;
/// # Ok(())
/// # }
/// ```
pub fn load_certificate_from_pem(pem_str: &str) -> Result<Certificate> {
    let mut cursor = Cursor::new(pem_str.as_bytes());

    match rustls_pemfile::read_one(&mut cursor)
        .map_err(|e| PkiError::PemError(format!("Failed to read PEM: {}", e)))?
    {
        Some(Item::X509Certificate(cert_der)) => Certificate::from_der(cert_der.as_ref()),
        Some(_) => Err(PkiError::PemError(
            "PEM file does not contain a certificate".to_string(),
        )),
        None => Err(PkiError::PemError("Empty PEM file".to_string())),
    }
}

/// Load an RSA key pair from an unencrypted PKCS#8 PEM string.
pub fn load_private_key_from_pem(pem_str: &str) -> Result<KeyPair> {
    let mut cursor = Cursor::new(pem_str.as_bytes());

    match rustls_pemfile::read_one(&mut cursor)
        .map_err(|e| PkiError::PemError(format!("Failed to read PEM: {}", e)))?
    {
        Some(Item::Pkcs8Key(key_der)) => RsaPrivateKey::from_pkcs8_der(key_der.secret_pkcs8_der())
            .map(KeyPair::from_private)
            .map_err(|e| PkiError::PemError(format!("Failed to decode RSA key: {}", e))),
        Some(_) => Err(PkiError::PemError(
            "PEM file does not contain a PKCS#8 private key".to_string(),
        )),
        None => Err(PkiError::PemError("Empty PEM file".to_string())),
    }
}

pub fn load_certificate_file(path: &Path) -> Result<Certificate> {
    let pem = fs::read_to_string(path).map_err(|e| PkiError::io(path, e))?;
    load_certificate_from_pem(&pem)
}

pub fn load_private_key_file(path: &Path) -> Result<KeyPair> {
    let pem = fs::read_to_string(path).map_err(|e| PkiError::io(path, e))?;
    load_private_key_from_pem(&pem)
}
