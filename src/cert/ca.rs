//! Root CA certificate operations.
//!
//! This module provides the only builder that self-signs, and the only one
//! that marks a certificate as a CA.

use crate::cert::builder::{build_and_sign, encode_extension, TbsParams};
use crate::cert::certificate::Certificate;
use crate::cert::identity::Identity;
use crate::crypto::rsa_keys::KeyPair;
use crate::error::Result;
use tracing::debug;
use x509_cert::ext::pkix::BasicConstraints;

/// Create a self-signed Root CA certificate.
///
/// Subject and issuer are both `identity`. A critical basic-constraints
/// extension with `CA=true` and no path length limit is always attached, and
/// the certificate is signed with the key pair's own private key.
///
/// # Arguments
///
/// * `identity` - Subject (and issuer) of the root
/// * `key_pair` - The RSA key pair for the CA
/// * `days_valid` - Number of days the certificate is valid for, must be > 0
///
/// # Example
///
/// ```rust,no_run
/// use pkiboot::cert::ca::build_self_signed;
/// use pkiboot::cert::Identity;
/// use pkiboot::crypto::rsa_keys::generate_default_rsa_keypair;
///
/// # fn example() -> pkiboot::error::Result<()> {
/// let keypair = generate_default_rsa_keypair()?;
/// let cert = build_self_signed(&Identity::new("My Root CA"), &keypair, 365)?;
/// assert!(cert.to_pem()?.contains("BEGIN CERTIFICATE"));
/// # Ok(())
/// # }
/// ```
pub fn build_self_signed(
    identity: &Identity,
    key_pair: &KeyPair,
    days_valid: u32,
) -> Result<Certificate> {
    let subject = identity.to_name()?;
    let issuer = subject.clone(); // Self-signed

    let basic_constraints = encode_extension(
        &BasicConstraints {
            ca: true,
            path_len_constraint: None,
        },
        true,
    )?;

    let cert = build_and_sign(
        TbsParams {
            subject,
            issuer,
            subject_public_key: key_pair.public_key(),
            days_valid,
            extensions: vec![basic_constraints],
        },
        key_pair.private_key(),
    )?;

    debug!(
        common_name = %identity.common_name,
        serial = ?cert.serial_number(),
        "built self-signed root certificate"
    );

    Ok(cert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::verify::{basic_constraints, extended_key_usage, verify_self_signed};
    use crate::crypto::rsa_keys::generate_default_rsa_keypair;
    use crate::error::PkiError;

    #[test]
    fn test_build_self_signed_root() {
        let keypair = generate_default_rsa_keypair().unwrap();
        let cert = build_self_signed(&Identity::new("Test Root CA"), &keypair, 365).unwrap();

        assert_eq!(cert.subject(), cert.issuer());
        assert_eq!(cert.common_name().as_deref(), Some("Test Root CA"));
        assert!(verify_self_signed(&cert).is_ok());

        let pem = cert.to_pem().unwrap();
        assert!(pem.contains("BEGIN CERTIFICATE"));
        assert!(pem.contains("END CERTIFICATE"));
    }

    #[test]
    fn test_root_is_critical_ca() {
        let keypair = generate_default_rsa_keypair().unwrap();
        let cert = build_self_signed(&Identity::new("Test Root CA"), &keypair, 365).unwrap();

        let bc = basic_constraints(&cert).unwrap().unwrap();
        assert!(bc.critical);
        assert!(bc.value.ca);
        assert_eq!(bc.value.path_len_constraint, None);

        assert!(extended_key_usage(&cert).unwrap().is_none());
        assert_eq!(cert.extensions().len(), 1);
    }

    #[test]
    fn test_build_self_signed_zero_days() {
        let keypair = generate_default_rsa_keypair().unwrap();
        let result = build_self_signed(&Identity::new("Test Root CA"), &keypair, 0);

        assert!(matches!(result, Err(PkiError::CertificateBuildError(_))));
    }
}
