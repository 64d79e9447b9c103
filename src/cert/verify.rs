//! Certificate verification.
//!
//! Signature checks over the DER-encoded TBS certificate, plus decoding of
//! the extensions that distinguish the root, server and client roles.

use crate::cert::certificate::Certificate;
use crate::crypto::rsa_keys::verify_sha256;
use crate::error::{PkiError, Result};
use const_oid::{AssociatedOid, ObjectIdentifier};
use der::{Decode, Encode};
use rsa::pkcs8::DecodePublicKey;
use rsa::RsaPublicKey;
use x509_cert::ext::pkix::{BasicConstraints, ExtendedKeyUsage};
use x509_cert::ext::Extension;

/// The part a certificate plays in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateRole {
    RootCa,
    Server,
    Client,
}

/// A decoded extension value together with its criticality flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedExtension<T> {
    pub critical: bool,
    pub value: T,
}

/// Recover the RSA public key from a certificate's subject public key info.
pub fn embedded_public_key(cert: &Certificate) -> Result<RsaPublicKey> {
    let spki_der = cert
        .as_x509()
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| PkiError::VerificationError(format!("Failed to encode SPKI: {}", e)))?;

    RsaPublicKey::from_public_key_der(&spki_der)
        .map_err(|e| PkiError::VerificationError(format!("Not an RSA public key: {}", e)))
}

/// Check that `cert` was signed by the private half of `issuer_key`.
pub fn verify_signed_by(cert: &Certificate, issuer_key: &RsaPublicKey) -> Result<()> {
    let x509 = cert.as_x509();

    if x509.signature_algorithm.oid != const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION {
        return Err(PkiError::VerificationError(format!(
            "Unsupported signature algorithm {}",
            x509.signature_algorithm.oid
        )));
    }

    let tbs_der = x509
        .tbs_certificate
        .to_der()
        .map_err(|e| PkiError::VerificationError(format!("Failed to encode TBS: {}", e)))?;

    let signature = x509.signature.as_bytes().ok_or_else(|| {
        PkiError::VerificationError("Signature has unused bits".to_string())
    })?;

    verify_sha256(issuer_key, &tbs_der, signature)
}

/// Check that `cert` names itself as issuer and verifies under its own key.
pub fn verify_self_signed(cert: &Certificate) -> Result<()> {
    if cert.subject() != cert.issuer() {
        return Err(PkiError::VerificationError(
            "Issuer differs from subject".to_string(),
        ));
    }

    verify_signed_by(cert, &embedded_public_key(cert)?)
}

fn find_extension(cert: &Certificate, oid: ObjectIdentifier) -> Option<&Extension> {
    cert.extensions().iter().find(|ext| ext.extn_id == oid)
}

fn decode_extension<T>(cert: &Certificate) -> Result<Option<DecodedExtension<T>>>
where
    T: AssociatedOid + for<'a> Decode<'a>,
{
    find_extension(cert, T::OID)
        .map(|ext| {
            T::from_der(ext.extn_value.as_bytes())
                .map(|value| DecodedExtension {
                    critical: ext.critical,
                    value,
                })
                .map_err(|e| {
                    PkiError::VerificationError(format!(
                        "Malformed extension {}: {}",
                        T::OID,
                        e
                    ))
                })
        })
        .transpose()
}

pub fn basic_constraints(cert: &Certificate) -> Result<Option<DecodedExtension<BasicConstraints>>> {
    decode_extension(cert)
}

pub fn extended_key_usage(
    cert: &Certificate,
) -> Result<Option<DecodedExtension<ExtendedKeyUsage>>> {
    decode_extension(cert)
}

/// Check that a certificate carries exactly the extensions of its role.
///
/// Root: critical `CA=true`, no client-auth usage. Server: neither.
/// Client: critical client-auth usage, never `CA=true`.
pub fn verify_role_extensions(cert: &Certificate, role: CertificateRole) -> Result<()> {
    let is_ca = basic_constraints(cert)?.map_or(false, |bc| bc.critical && bc.value.ca);
    let client_auth = extended_key_usage(cert)?.map_or(false, |eku| {
        eku.critical
            && eku
                .value
                .0
                .contains(&const_oid::db::rfc5280::ID_KP_CLIENT_AUTH)
    });

    let (want_ca, want_client_auth) = match role {
        CertificateRole::RootCa => (true, false),
        CertificateRole::Server => (false, false),
        CertificateRole::Client => (false, true),
    };

    if is_ca != want_ca || client_auth != want_client_auth {
        return Err(PkiError::VerificationError(format!(
            "{:?} certificate {:?} has CA={} client-auth={}",
            role,
            cert.common_name().unwrap_or_default(),
            is_ca,
            client_auth
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::ca::build_self_signed;
    use crate::cert::entity::build_issued;
    use crate::cert::Identity;
    use crate::crypto::rsa_keys::generate_default_rsa_keypair;

    #[test]
    fn test_embedded_public_key_matches_keypair() {
        let keypair = generate_default_rsa_keypair().unwrap();
        let cert = build_self_signed(&Identity::new("Root"), &keypair, 30).unwrap();

        assert_eq!(&embedded_public_key(&cert).unwrap(), keypair.public_key());
    }

    #[test]
    fn test_roles_and_signatures() {
        let root_keypair = generate_default_rsa_keypair().unwrap();
        let root = build_self_signed(&Identity::new("Root"), &root_keypair, 30).unwrap();
        let leaf_keypair = generate_default_rsa_keypair().unwrap();
        let client = build_issued(
            &Identity::new("alice"),
            &leaf_keypair,
            &root,
            root_keypair.private_key(),
            30,
            true,
        )
        .unwrap();

        assert!(verify_role_extensions(&root, CertificateRole::RootCa).is_ok());
        assert!(verify_role_extensions(&root, CertificateRole::Server).is_err());
        assert!(verify_role_extensions(&client, CertificateRole::Client).is_ok());
        assert!(verify_role_extensions(&client, CertificateRole::Server).is_err());

        // A leaf is not self-signed
        assert!(verify_self_signed(&client).is_err());
        assert!(verify_signed_by(&client, root_keypair.public_key()).is_ok());
        assert!(verify_signed_by(&root, leaf_keypair.public_key()).is_err());
    }
}
