//! PEM file writer.
//!
//! One-shot writes: the file handle is scoped to the call and closed on every
//! exit path. Private keys are written unencrypted (PKCS#8) since the output
//! is a test PKI.

use crate::cert::certificate::Certificate;
use crate::crypto::rsa_keys::KeyPair;
use crate::error::{PkiError, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Write a private key as PKCS#8 PEM.
///
/// On Unix the file is created with mode `0600`.
pub fn write_private_key(key: &KeyPair, path: &Path) -> Result<()> {
    let pem = key.to_pkcs8_pem()?;
    write_pem(open_private(path)?, path, pem.as_bytes())?;

    info!(path = %path.display(), "wrote private key");
    Ok(())
}

/// Write a certificate as PEM-armored DER.
pub fn write_certificate(cert: &Certificate, path: &Path) -> Result<()> {
    let pem = cert.to_pem()?;
    let file = File::create(path).map_err(|e| PkiError::io(path, e))?;
    write_pem(file, path, pem.as_bytes())?;

    info!(path = %path.display(), "wrote certificate");
    Ok(())
}

fn write_pem(mut file: File, path: &Path, contents: &[u8]) -> Result<()> {
    file.write_all(contents).map_err(|e| PkiError::io(path, e))?;
    file.sync_all().map_err(|e| PkiError::io(path, e))
}

#[cfg(unix)]
fn open_private(path: &Path) -> Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .map_err(|e| PkiError::io(path, e))
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| PkiError::io(path, e))
}
