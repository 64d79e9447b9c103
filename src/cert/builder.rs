//! Certificate builder utilities.
//!
//! Shared pieces of the root and leaf builders: serial numbers, validity
//! windows, subject public key info, extension encoding and signing.

use crate::cert::certificate::Certificate;
use crate::crypto::rsa_keys::sign_sha256;
use crate::error::{PkiError, Result};
use const_oid::AssociatedOid;
use der::asn1::{Any, BitString, OctetString};
use der::{Decode, Encode};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs8::EncodePublicKey;
use rsa::{RsaPrivateKey, RsaPublicKey};
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use std::time::Duration;
use x509_cert::certificate::Version;
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::time::Validity;
use x509_cert::TbsCertificate;

/// Serial numbers are 20 random bytes, the RFC 5280 maximum.
const SERIAL_NUMBER_LEN: usize = 20;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Everything that differs between a root and a leaf certificate.
pub(crate) struct TbsParams<'a> {
    pub subject: Name,
    pub issuer: Name,
    pub subject_public_key: &'a RsaPublicKey,
    pub days_valid: u32,
    pub extensions: Vec<Extension>,
}

/// Draw a random, positive serial number.
pub fn generate_serial_number() -> Result<SerialNumber> {
    let mut bytes = [0u8; SERIAL_NUMBER_LEN];
    OsRng.fill_bytes(&mut bytes);
    // Clear the sign bit and keep the leading byte non-zero so the
    // INTEGER stays positive and minimally encoded.
    bytes[0] = (bytes[0] & 0x7F) | 0x01;

    SerialNumber::new(&bytes).map_err(|e| {
        PkiError::CertificateBuildError(format!("Failed to create serial number: {}", e))
    })
}

/// Validity window `[now, now + days]`.
pub fn create_validity(days: u32) -> Result<Validity> {
    if days == 0 {
        return Err(PkiError::CertificateBuildError(
            "days_valid must be greater than zero".to_string(),
        ));
    }

    Validity::from_now(Duration::from_secs(u64::from(days) * SECONDS_PER_DAY))
        .map_err(|e| PkiError::CertificateBuildError(format!("Failed to create validity: {}", e)))
}

pub fn create_subject_public_key_info(public_key: &RsaPublicKey) -> Result<SubjectPublicKeyInfoOwned> {
    let document = public_key.to_public_key_der().map_err(|e| {
        PkiError::CertificateBuildError(format!("Failed to encode public key: {}", e))
    })?;

    SubjectPublicKeyInfoOwned::from_der(document.as_bytes()).map_err(|e| {
        PkiError::CertificateBuildError(format!("Failed to decode public key info: {}", e))
    })
}

/// `sha256WithRSAEncryption` with the NULL parameters RFC 4055 requires.
pub fn sha256_with_rsa_algorithm() -> AlgorithmIdentifierOwned {
    AlgorithmIdentifierOwned {
        oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
        parameters: Some(Any::null()),
    }
}

/// DER-encode an extension value under its associated OID.
pub fn encode_extension<T>(value: &T, critical: bool) -> Result<Extension>
where
    T: AssociatedOid + Encode,
{
    let der = value.to_der().map_err(|e| {
        PkiError::CertificateBuildError(format!("Failed to encode extension {}: {}", T::OID, e))
    })?;

    let extn_value = OctetString::new(der).map_err(|e| {
        PkiError::CertificateBuildError(format!("Failed to wrap extension {}: {}", T::OID, e))
    })?;

    Ok(Extension {
        extn_id: T::OID,
        critical,
        extn_value,
    })
}

fn sign_tbs(tbs: &TbsCertificate, signing_key: &RsaPrivateKey) -> Result<BitString> {
    let tbs_der = tbs
        .to_der()
        .map_err(|e| PkiError::CertificateBuildError(format!("Failed to encode TBS: {}", e)))?;

    let signature = sign_sha256(signing_key, &tbs_der)?;

    BitString::from_bytes(&signature).map_err(|e| {
        PkiError::CertificateBuildError(format!("Failed to create signature bitstring: {}", e))
    })
}

/// Assemble a v3 TBS certificate and sign it with `signing_key`.
pub(crate) fn build_and_sign(params: TbsParams<'_>, signing_key: &RsaPrivateKey) -> Result<Certificate> {
    let validity = create_validity(params.days_valid)?;
    let serial_number = generate_serial_number()?;
    let subject_public_key_info = create_subject_public_key_info(params.subject_public_key)?;
    let signature_algorithm = sha256_with_rsa_algorithm();

    let extensions = if params.extensions.is_empty() {
        None
    } else {
        Some(params.extensions)
    };

    let tbs = TbsCertificate {
        version: Version::V3,
        serial_number,
        signature: signature_algorithm.clone(),
        issuer: params.issuer,
        validity,
        subject: params.subject,
        subject_public_key_info,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions,
    };

    let signature = sign_tbs(&tbs, signing_key)?;

    Ok(Certificate::new(x509_cert::Certificate {
        tbs_certificate: tbs,
        signature_algorithm,
        signature,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use x509_cert::ext::pkix::BasicConstraints;

    #[test]
    fn test_serial_numbers_are_positive_and_distinct() {
        let a = generate_serial_number().unwrap();
        let b = generate_serial_number().unwrap();

        assert_ne!(a, b);
        assert_eq!(a.as_bytes().len(), SERIAL_NUMBER_LEN);
        assert!(a.as_bytes()[0] < 0x80);
        assert_ne!(a.as_bytes()[0], 0);
    }

    #[test]
    fn test_create_validity_window() {
        let validity = create_validity(365).unwrap();

        let not_before = validity.not_before.to_unix_duration();
        let not_after = validity.not_after.to_unix_duration();
        assert_eq!((not_after - not_before).as_secs(), 365 * SECONDS_PER_DAY);
    }

    #[test]
    fn test_create_validity_rejects_zero_days() {
        let result = create_validity(0);
        assert!(matches!(result, Err(PkiError::CertificateBuildError(_))));
    }

    #[test]
    fn test_encode_extension_uses_associated_oid() {
        let ext = encode_extension(
            &BasicConstraints {
                ca: true,
                path_len_constraint: None,
            },
            true,
        )
        .unwrap();

        assert_eq!(ext.extn_id, const_oid::db::rfc5280::ID_CE_BASIC_CONSTRAINTS);
        assert!(ext.critical);

        let decoded = BasicConstraints::from_der(ext.extn_value.as_bytes()).unwrap();
        assert!(decoded.ca);
        assert_eq!(decoded.path_len_constraint, None);
    }

    #[test]
    fn test_signature_algorithm_has_null_parameters() {
        let alg = sha256_with_rsa_algorithm();
        assert_eq!(alg.oid.to_string(), "1.2.840.113549.1.1.11");
        assert!(alg.parameters.is_some());
    }
}
