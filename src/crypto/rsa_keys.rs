//! RSA key operations.
//!
//! Every principal (root, server, client) gets its own freshly generated key
//! pair drawn from the operating system's secure random source.

use crate::error::{PkiError, Result};
use rand::rngs::OsRng;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs1::LineEnding;
use rsa::pkcs8::EncodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use tracing::debug;

/// Default modulus size in bits.
pub const DEFAULT_KEY_SIZE: usize = 2048;

/// Default public exponent (F4).
pub const DEFAULT_PUBLIC_EXPONENT: u64 = 65537;

/// Smallest modulus accepted by [`generate_rsa_keypair`].
pub const MIN_KEY_SIZE: usize = 2048;

/// An RSA key pair: a private key and the public key derived from it.
#[derive(Debug, Clone)]
pub struct KeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl KeyPair {
    /// Create a key pair from a private key.
    pub fn from_private(private: RsaPrivateKey) -> Self {
        let public = RsaPublicKey::from(&private);
        Self { private, public }
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Modulus size in bits.
    pub fn key_size(&self) -> usize {
        self.public.n().bits()
    }

    pub fn public_exponent(&self) -> u64 {
        self.public
            .e()
            .to_bytes_be()
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
    }

    /// Serialize the private key as unencrypted PKCS#8 PEM.
    pub fn to_pkcs8_pem(&self) -> Result<String> {
        self.private
            .to_pkcs8_pem(LineEnding::LF)
            .map(|pem| pem.as_str().to_owned())
            .map_err(|e| PkiError::PemError(format!("Failed to encode private key: {}", e)))
    }

    /// Sign a message with PKCS#1 v1.5 padding over SHA-256.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        sign_sha256(&self.private, message)
    }

    /// Verify a PKCS#1 v1.5 / SHA-256 signature against this key pair's public key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        verify_sha256(&self.public, message, signature)
    }
}

/// Generate an RSA key pair.
///
/// Fails with [`PkiError::KeyGenerationError`] when the modulus is below
/// [`MIN_KEY_SIZE`], when the exponent is even or smaller than 3, or when the
/// underlying primitive rejects the parameters.
///
/// # Example
///
/// ```rust,no_run
/// use pkiboot::crypto::rsa_keys::generate_rsa_keypair;
///
/// let keypair = generate_rsa_keypair(2048, 65537).unwrap();
/// assert_eq!(keypair.key_size(), 2048);
/// ```
pub fn generate_rsa_keypair(key_size: usize, public_exponent: u64) -> Result<KeyPair> {
    if key_size < MIN_KEY_SIZE {
        return Err(PkiError::KeyGenerationError(format!(
            "Key size {} is below the minimum of {} bits",
            key_size, MIN_KEY_SIZE
        )));
    }
    if public_exponent < 3 || public_exponent % 2 == 0 {
        return Err(PkiError::KeyGenerationError(format!(
            "Public exponent {} must be odd and at least 3",
            public_exponent
        )));
    }

    debug!(key_size, public_exponent, "generating RSA key pair");

    let exponent = BigUint::from(public_exponent);
    let private = RsaPrivateKey::new_with_exp(&mut OsRng, key_size, &exponent).map_err(|e| {
        PkiError::KeyGenerationError(format!(
            "Failed to generate {}-bit key with exponent {}: {}",
            key_size, public_exponent, e
        ))
    })?;

    Ok(KeyPair::from_private(private))
}

/// Generate a 2048-bit key pair with exponent 65537.
pub fn generate_default_rsa_keypair() -> Result<KeyPair> {
    generate_rsa_keypair(DEFAULT_KEY_SIZE, DEFAULT_PUBLIC_EXPONENT)
}

/// Produce a PKCS#1 v1.5 / SHA-256 signature with `private_key`.
pub fn sign_sha256(private_key: &RsaPrivateKey, message: &[u8]) -> Result<Vec<u8>> {
    let signing_key = SigningKey::<Sha256>::new(private_key.clone());
    let signature = signing_key
        .try_sign(message)
        .map_err(|e| PkiError::CertificateBuildError(format!("Signing failed: {}", e)))?;

    Ok(signature.to_vec())
}

/// Check a PKCS#1 v1.5 / SHA-256 signature against `public_key`.
pub fn verify_sha256(public_key: &RsaPublicKey, message: &[u8], signature: &[u8]) -> Result<()> {
    let verifying_key = VerifyingKey::<Sha256>::new(public_key.clone());
    let signature = Signature::try_from(signature)
        .map_err(|e| PkiError::VerificationError(format!("Malformed signature: {}", e)))?;

    verifying_key
        .verify(message, &signature)
        .map_err(|e| PkiError::VerificationError(format!("Signature verification failed: {}", e)))
}
