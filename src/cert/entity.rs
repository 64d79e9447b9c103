//! End-entity certificate operations.
//!
//! Server and client certificates issued by the root. Neither is ever a CA.

use crate::cert::builder::{build_and_sign, encode_extension, TbsParams};
use crate::cert::certificate::Certificate;
use crate::cert::identity::Identity;
use crate::cert::verify::embedded_public_key;
use crate::crypto::rsa_keys::KeyPair;
use crate::error::{PkiError, Result};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::debug;
use x509_cert::ext::pkix::ExtendedKeyUsage;

/// Create a leaf certificate signed by a CA.
///
/// The issuer name is copied from `issuer_certificate`. With `client_auth`
/// set, a critical extended-key-usage extension asserting TLS client
/// authentication is attached; otherwise (server case) no extension is added.
///
/// Fails with [`PkiError::CertificateBuildError`] if `days_valid` is zero or
/// if `issuer_private_key` does not belong to `issuer_certificate`.
///
/// # Example
///
/// ```rust,no_run
/// use pkiboot::cert::ca::build_self_signed;
/// use pkiboot::cert::entity::build_issued;
/// use pkiboot::cert::Identity;
/// use pkiboot::crypto::rsa_keys::generate_default_rsa_keypair;
///
/// # fn example() -> pkiboot::error::Result<()> {
/// let root_keypair = generate_default_rsa_keypair()?;
/// let root_cert = build_self_signed(&Identity::new("Root CA"), &root_keypair, 365)?;
///
/// let client_keypair = generate_default_rsa_keypair()?;
/// let client_cert = build_issued(
///     &Identity::new("alice"),
///     &client_keypair,
///     &root_cert,
///     root_keypair.private_key(),
///     365,
///     true,
/// )?;
/// assert_eq!(client_cert.issuer(), root_cert.subject());
/// # Ok(())
/// # }
/// ```
pub fn build_issued(
    identity: &Identity,
    subject_key_pair: &KeyPair,
    issuer_certificate: &Certificate,
    issuer_private_key: &RsaPrivateKey,
    days_valid: u32,
    client_auth: bool,
) -> Result<Certificate> {
    let issuer_public_key = embedded_public_key(issuer_certificate)?;
    if RsaPublicKey::from(issuer_private_key) != issuer_public_key {
        return Err(PkiError::CertificateBuildError(format!(
            "Signing key does not match issuer certificate for '{}'",
            identity.common_name
        )));
    }

    let subject = identity.to_name()?;
    let issuer = issuer_certificate.subject().clone(); // Issuer is the CA

    let mut extensions = Vec::new();
    if client_auth {
        extensions.push(encode_extension(
            &ExtendedKeyUsage(vec![const_oid::db::rfc5280::ID_KP_CLIENT_AUTH]),
            true,
        )?);
    }

    // Sign with the CA's key, not the subject's
    let cert = build_and_sign(
        TbsParams {
            subject,
            issuer,
            subject_public_key: subject_key_pair.public_key(),
            days_valid,
            extensions,
        },
        issuer_private_key,
    )?;

    debug!(
        common_name = %identity.common_name,
        serial = ?cert.serial_number(),
        client_auth,
        "issued leaf certificate"
    );

    Ok(cert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::ca::build_self_signed;
    use crate::cert::verify::{basic_constraints, extended_key_usage, verify_signed_by};
    use crate::crypto::rsa_keys::generate_default_rsa_keypair;

    fn root() -> (KeyPair, Certificate) {
        let keypair = generate_default_rsa_keypair().unwrap();
        let cert = build_self_signed(&Identity::new("Root CA"), &keypair, 3650).unwrap();
        (keypair, cert)
    }

    #[test]
    fn test_build_server_certificate() {
        let (root_keypair, root_cert) = root();
        let server_keypair = generate_default_rsa_keypair().unwrap();

        let cert = build_issued(
            &Identity::new("server.local"),
            &server_keypair,
            &root_cert,
            root_keypair.private_key(),
            365,
            false,
        )
        .unwrap();

        assert_eq!(cert.issuer(), root_cert.subject());
        assert!(verify_signed_by(&cert, root_keypair.public_key()).is_ok());
        assert!(cert.extensions().is_empty());
        assert!(basic_constraints(&cert).unwrap().is_none());
        assert!(extended_key_usage(&cert).unwrap().is_none());
    }

    #[test]
    fn test_build_client_certificate() {
        let (root_keypair, root_cert) = root();
        let client_keypair = generate_default_rsa_keypair().unwrap();

        let cert = build_issued(
            &Identity::new("alice"),
            &client_keypair,
            &root_cert,
            root_keypair.private_key(),
            365,
            true,
        )
        .unwrap();

        let eku = extended_key_usage(&cert).unwrap().unwrap();
        assert!(eku.critical);
        assert_eq!(eku.value.0, vec![const_oid::db::rfc5280::ID_KP_CLIENT_AUTH]);
        assert!(basic_constraints(&cert).unwrap().is_none());

        // Signed by the root, not by the subject's own key
        assert!(verify_signed_by(&cert, client_keypair.public_key()).is_err());
    }

    #[test]
    fn test_build_issued_rejects_foreign_signing_key() {
        let (_, root_cert) = root();
        let other_keypair = generate_default_rsa_keypair().unwrap();

        let result = build_issued(
            &Identity::new("server"),
            &other_keypair,
            &root_cert,
            other_keypair.private_key(),
            365,
            false,
        );

        assert!(matches!(result, Err(PkiError::CertificateBuildError(_))));
    }

    #[test]
    fn test_build_issued_zero_days() {
        let (root_keypair, root_cert) = root();

        let result = build_issued(
            &Identity::new("server"),
            &root_keypair,
            &root_cert,
            root_keypair.private_key(),
            0,
            false,
        );

        assert!(matches!(result, Err(PkiError::CertificateBuildError(_))));
    }
}
