//! Certificate authority bootstrap.
//!
//! Runs three phases in order, root, then server, then clients, entirely in
//! memory, and only then writes `2 + 2 * (1 + clients)` PEM files into the
//! destination directory. Any error aborts the run. Files already written
//! when a write fails are left in place.

use crate::cert::ca::build_self_signed;
use crate::cert::certificate::Certificate;
use crate::cert::entity::build_issued;
use crate::cert::identity::Identity;
use crate::cert::loader::{load_certificate_file, load_private_key_file};
use crate::cert::verify::{
    embedded_public_key, verify_role_extensions, verify_self_signed, verify_signed_by,
    CertificateRole,
};
use crate::config::PkiConfig;
use crate::crypto::rsa_keys::{generate_rsa_keypair, KeyPair};
use crate::error::{PkiError, Result};
use crate::storage::layout::{validate_file_component, Principal};
use crate::storage::pem_writer::{write_certificate, write_private_key};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A key pair and the certificate binding it to a principal.
#[derive(Debug, Clone)]
pub struct IssuedPrincipal {
    pub principal: Principal,
    pub key_pair: KeyPair,
    pub certificate: Certificate,
}

/// The full set of material produced by one run.
#[derive(Debug, Clone)]
pub struct IssuedHierarchy {
    pub root: IssuedPrincipal,
    pub server: IssuedPrincipal,
    /// In the order the client names were supplied.
    pub clients: Vec<IssuedPrincipal>,
}

impl IssuedHierarchy {
    /// Root first, then server, then clients.
    pub fn principals(&self) -> impl Iterator<Item = &IssuedPrincipal> {
        std::iter::once(&self.root)
            .chain(std::iter::once(&self.server))
            .chain(self.clients.iter())
    }

    /// Write every certificate and key into `dir`, returning the paths written.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(2 * (2 + self.clients.len()));

        for issued in self.principals() {
            let cert_path = issued.principal.certificate_path(dir);
            write_certificate(&issued.certificate, &cert_path)?;
            written.push(cert_path);

            let key_path = issued.principal.key_path(dir);
            write_private_key(&issued.key_pair, &key_path)?;
            written.push(key_path);
        }

        Ok(written)
    }
}

/// Outcome of a successful bootstrap.
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    pub destination: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Bootstrap with [`PkiConfig::default`].
///
/// # Example
///
/// ```rust,no_run
/// use pkiboot::bootstrap::bootstrap;
/// use std::path::Path;
///
/// # fn example() -> pkiboot::error::Result<()> {
/// bootstrap("Root", "Server", &["alice", "bob"], Path::new("/tmp/certs"))?;
/// # Ok(())
/// # }
/// ```
pub fn bootstrap<S: AsRef<str>>(
    root_cn: &str,
    server_cn: &str,
    client_cns: &[S],
    destination_dir: &Path,
) -> Result<()> {
    bootstrap_with_config(
        &PkiConfig::default(),
        root_cn,
        server_cn,
        client_cns,
        destination_dir,
    )
    .map(|_| ())
}

/// Generate the root, server and client material and write it to `destination_dir`.
///
/// The destination must already exist; it is never created. Client common
/// names are checked for file-name safety before any key is generated.
pub fn bootstrap_with_config<S: AsRef<str>>(
    config: &PkiConfig,
    root_cn: &str,
    server_cn: &str,
    client_cns: &[S],
    destination_dir: &Path,
) -> Result<BootstrapReport> {
    if !destination_dir.is_dir() {
        return Err(PkiError::DestinationNotFoundError(
            destination_dir.to_path_buf(),
        ));
    }

    let hierarchy = issue_hierarchy(config, root_cn, server_cn, client_cns)?;
    let files = hierarchy.write_to(destination_dir)?;

    info!(
        destination = %destination_dir.display(),
        files = files.len(),
        "bootstrap complete"
    );

    Ok(BootstrapReport {
        destination: destination_dir.to_path_buf(),
        files,
    })
}

/// Run the root, server and client phases without touching the filesystem.
pub fn issue_hierarchy<S: AsRef<str>>(
    config: &PkiConfig,
    root_cn: &str,
    server_cn: &str,
    client_cns: &[S],
) -> Result<IssuedHierarchy> {
    config.validate()?;
    check_client_names(client_cns)?;

    info!(root_cn, "root phase");
    let root_key = generate_rsa_keypair(config.key_size, config.public_exponent)?;
    let root_cert = build_self_signed(
        &Identity::with_organization(root_cn, config.organization.as_str()),
        &root_key,
        config.days_valid,
    )?;
    let root = IssuedPrincipal {
        principal: Principal::Root,
        key_pair: root_key,
        certificate: root_cert,
    };

    info!(server_cn, "server phase");
    let server = issue_leaf(config, &root, server_cn, Principal::Server, false)?;

    info!(clients = client_cns.len(), "client phase");
    let clients = client_cns
        .iter()
        .map(|cn| {
            let cn = cn.as_ref();
            issue_leaf(config, &root, cn, Principal::Client(cn.to_string()), true)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(IssuedHierarchy {
        root,
        server,
        clients,
    })
}

fn issue_leaf(
    config: &PkiConfig,
    root: &IssuedPrincipal,
    common_name: &str,
    principal: Principal,
    client_auth: bool,
) -> Result<IssuedPrincipal> {
    let key_pair = generate_rsa_keypair(config.key_size, config.public_exponent)?;
    let certificate = build_issued(
        &Identity::with_organization(common_name, config.organization.as_str()),
        &key_pair,
        &root.certificate,
        root.key_pair.private_key(),
        config.days_valid,
        client_auth,
    )?;

    Ok(IssuedPrincipal {
        principal,
        key_pair,
        certificate,
    })
}

fn check_client_names<S: AsRef<str>>(client_cns: &[S]) -> Result<()> {
    let mut seen = HashSet::new();
    for cn in client_cns {
        let cn = cn.as_ref();
        validate_file_component(cn)?;
        if !seen.insert(cn) {
            warn!(
                client_cn = cn,
                "duplicate client common name, later files overwrite earlier ones"
            );
        }
    }
    Ok(())
}

/// Check a destination directory written by [`bootstrap`].
///
/// Every listed principal's key must match its certificate, the root must be
/// self-signed, every leaf must verify under the root, and each certificate
/// must carry exactly the extensions of its role.
pub fn verify_destination<S: AsRef<str>>(destination_dir: &Path, client_cns: &[S]) -> Result<usize> {
    if !destination_dir.is_dir() {
        return Err(PkiError::DestinationNotFoundError(
            destination_dir.to_path_buf(),
        ));
    }

    let mut principals = vec![
        (Principal::Root, CertificateRole::RootCa),
        (Principal::Server, CertificateRole::Server),
    ];
    principals.extend(
        client_cns
            .iter()
            .map(|cn| (Principal::Client(cn.as_ref().to_string()), CertificateRole::Client)),
    );

    let root_cert = load_certificate_file(&Principal::Root.certificate_path(destination_dir))?;
    verify_self_signed(&root_cert)?;
    let root_key = embedded_public_key(&root_cert)?;

    for (principal, role) in &principals {
        let cert_path = principal.certificate_path(destination_dir);
        let cert = load_certificate_file(&cert_path)?;
        let key_pair = load_private_key_file(&principal.key_path(destination_dir))?;

        if &embedded_public_key(&cert)? != key_pair.public_key() {
            return Err(PkiError::VerificationError(format!(
                "{} does not match its private key",
                cert_path.display()
            )));
        }
        if *role != CertificateRole::RootCa && cert.issuer() != root_cert.subject() {
            return Err(PkiError::VerificationError(format!(
                "{} is not issued by the root",
                cert_path.display()
            )));
        }
        verify_signed_by(&cert, &root_key)?;
        verify_role_extensions(&cert, *role)?;

        info!(path = %cert_path.display(), ?role, "verified");
    }

    Ok(principals.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    #[test]
    fn test_issue_hierarchy_invariants() {
        let config = PkiConfig::default();
        let hierarchy = issue_hierarchy(&config, "Root", "Server", &["alice", "bob"]).unwrap();

        assert_eq!(hierarchy.clients.len(), 2);
        assert_eq!(
            hierarchy.clients[0].principal,
            Principal::Client("alice".to_string())
        );
        assert_eq!(
            hierarchy.clients[1].certificate.common_name().as_deref(),
            Some("bob")
        );

        let root_public = hierarchy.root.key_pair.public_key();
        assert!(verify_self_signed(&hierarchy.root.certificate).is_ok());

        let mut serials = HashSet::new();
        let now = SystemTime::now();
        for issued in hierarchy.principals() {
            let cert = &issued.certificate;
            assert_eq!(&embedded_public_key(cert).unwrap(), issued.key_pair.public_key());
            assert!(verify_signed_by(cert, root_public).is_ok());
            assert!(serials.insert(cert.serial_number().as_bytes().to_vec()));
            assert!(cert.not_before() <= now && now <= cert.not_after());
        }

        assert!(verify_role_extensions(&hierarchy.root.certificate, CertificateRole::RootCa).is_ok());
        assert!(verify_role_extensions(&hierarchy.server.certificate, CertificateRole::Server).is_ok());
        for client in &hierarchy.clients {
            assert!(verify_role_extensions(&client.certificate, CertificateRole::Client).is_ok());
        }
    }

    #[test]
    fn test_issue_hierarchy_without_clients() {
        let hierarchy =
            issue_hierarchy::<&str>(&PkiConfig::default(), "Root", "Server", &[]).unwrap();
        assert!(hierarchy.clients.is_empty());
        assert_eq!(hierarchy.principals().count(), 2);
    }

    #[test]
    fn test_issue_hierarchy_uses_config_organization() {
        let config = PkiConfig {
            organization: "Acme".to_string(),
            days_valid: 7,
            ..PkiConfig::default()
        };
        let hierarchy = issue_hierarchy::<&str>(&config, "Root", "Server", &[]).unwrap();

        let server = &hierarchy.server.certificate;
        let days = server
            .not_after()
            .duration_since(server.not_before())
            .unwrap()
            .as_secs();
        assert_eq!(days, 7 * 24 * 60 * 60);

        let org = server.subject().0[0].0.iter().next().unwrap();
        assert_eq!(org.value.value(), b"Acme");
    }

    #[test]
    fn test_unsafe_client_name_rejected_before_keygen() {
        let result = issue_hierarchy(&PkiConfig::default(), "Root", "Server", &["../evil"]);
        assert!(matches!(result, Err(PkiError::InvalidCommonName(_))));
    }

    #[test]
    fn test_duplicate_client_names_accepted() {
        assert!(check_client_names(&["alice", "alice"]).is_ok());
    }
}
