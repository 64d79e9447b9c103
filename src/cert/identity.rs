//! Certificate subject identities.

use crate::error::{PkiError, Result};
use const_oid::ObjectIdentifier;
use der::asn1::{Any, SetOfVec};
use der::Tag;
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{Name, RdnSequence, RelativeDistinguishedName};

/// Organization placed in every subject unless overridden.
pub const DEFAULT_ORGANIZATION: &str = "Test, Inc.";

/// A subject identity: a common name plus an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub common_name: String,
    pub organization: String,
}

impl Identity {
    /// Identity under [`DEFAULT_ORGANIZATION`].
    pub fn new(common_name: impl Into<String>) -> Self {
        Self::with_organization(common_name, DEFAULT_ORGANIZATION)
    }

    pub fn with_organization(
        common_name: impl Into<String>,
        organization: impl Into<String>,
    ) -> Self {
        Self {
            common_name: common_name.into(),
            organization: organization.into(),
        }
    }

    /// Build the distinguished name `O=<organization>, CN=<common name>`.
    ///
    /// Each attribute lives in its own RDN, organization first.
    pub fn to_name(&self) -> Result<Name> {
        if self.common_name.is_empty() {
            return Err(PkiError::CertificateBuildError(
                "Common name cannot be empty".to_string(),
            ));
        }

        let organization = utf8_rdn(const_oid::db::rfc4519::O, &self.organization)?;
        let common_name = utf8_rdn(const_oid::db::rfc4519::CN, &self.common_name)?;

        Ok(RdnSequence(vec![organization, common_name]))
    }
}

fn utf8_rdn(oid: ObjectIdentifier, value: &str) -> Result<RelativeDistinguishedName> {
    let attr = AttributeTypeAndValue {
        oid,
        value: Any::new(Tag::Utf8String, value.as_bytes()).map_err(|e| {
            PkiError::CertificateBuildError(format!("Invalid attribute '{}': {}", value, e))
        })?,
    };

    let mut attr_set = SetOfVec::new();
    attr_set
        .insert_ordered(attr)
        .map_err(|e| PkiError::CertificateBuildError(format!("Failed to add attribute: {}", e)))?;

    Ok(RelativeDistinguishedName::from(attr_set))
}

/// First common name found in a distinguished name.
pub fn common_name_of(name: &Name) -> Option<String> {
    name.0
        .iter()
        .flat_map(|rdn| rdn.0.iter())
        .find(|atv| atv.oid == const_oid::db::rfc4519::CN)
        .and_then(|atv| std::str::from_utf8(atv.value.value()).ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_default_organization() {
        let identity = Identity::new("Root");
        assert_eq!(identity.organization, "Test, Inc.");
        assert_eq!(identity.common_name, "Root");
    }

    #[test]
    fn test_to_name_has_organization_then_common_name() {
        let name = Identity::new("alice").to_name().unwrap();

        assert_eq!(name.0.len(), 2);
        let first = name.0[0].0.iter().next().unwrap();
        assert_eq!(first.oid, const_oid::db::rfc4519::O);
        assert_eq!(first.value.value(), b"Test, Inc.");
        assert_eq!(common_name_of(&name).as_deref(), Some("alice"));
    }

    #[test]
    fn test_to_name_rejects_empty_common_name() {
        let result = Identity::new("").to_name();
        assert!(matches!(result, Err(PkiError::CertificateBuildError(_))));
    }

    #[test]
    fn test_custom_organization() {
        let name = Identity::with_organization("srv", "Acme").to_name().unwrap();
        let first = name.0[0].0.iter().next().unwrap();
        assert_eq!(first.value.value(), b"Acme");
    }
}
