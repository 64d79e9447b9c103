//! Owned certificate wrapper.

use crate::cert::identity::common_name_of;
use crate::error::{PkiError, Result};
use der::{Decode, Encode};
use std::time::SystemTime;
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;

/// A signed X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    inner: x509_cert::Certificate,
}

impl Certificate {
    pub(crate) fn new(inner: x509_cert::Certificate) -> Self {
        Self { inner }
    }

    /// Decode a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        x509_cert::Certificate::from_der(der)
            .map(Self::new)
            .map_err(|e| PkiError::PemError(format!("Failed to decode certificate: {}", e)))
    }

    /// The underlying `x509-cert` structure.
    pub fn as_x509(&self) -> &x509_cert::Certificate {
        &self.inner
    }

    pub fn serial_number(&self) -> &SerialNumber {
        &self.inner.tbs_certificate.serial_number
    }

    pub fn subject(&self) -> &Name {
        &self.inner.tbs_certificate.subject
    }

    pub fn issuer(&self) -> &Name {
        &self.inner.tbs_certificate.issuer
    }

    pub fn common_name(&self) -> Option<String> {
        common_name_of(self.subject())
    }

    pub fn not_before(&self) -> SystemTime {
        self.inner.tbs_certificate.validity.not_before.to_system_time()
    }

    pub fn not_after(&self) -> SystemTime {
        self.inner.tbs_certificate.validity.not_after.to_system_time()
    }

    pub fn extensions(&self) -> &[Extension] {
        self.inner
            .tbs_certificate
            .extensions
            .as_deref()
            .unwrap_or_default()
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| PkiError::PemError(format!("Failed to encode certificate: {}", e)))
    }

    /// PEM-armored DER (`CERTIFICATE` tag).
    pub fn to_pem(&self) -> Result<String> {
        let der = self.to_der()?;
        let config = pem::EncodeConfig::new().set_line_ending(pem::LineEnding::LF);
        Ok(pem::encode_config(&pem::Pem::new("CERTIFICATE", der), config))
    }
}
