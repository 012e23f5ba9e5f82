//! TLS bootstrap.
//!
//! One-time startup step: if no certificate file exists yet, a self-signed
//! certificate/key pair is generated and written as PEM, then the pair is
//! loaded into a `tokio_rustls::TlsAcceptor`. Nothing here runs after the
//! listener is up; failed handshakes are handled per connection by the
//! server loop.

use crate::error::TlsError;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use std::fs;
use std::io::BufReader;
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, info};

/// Generate a self-signed certificate if the certificate file is missing.
///
/// Returns `true` when a new pair was written. An existing certificate is
/// never touched, so a pair supplied by the operator survives restarts.
pub fn ensure_server_cert(
    cert_path: &Path,
    key_path: &Path,
    host: &str,
) -> Result<bool, TlsError> {
    if cert_path.exists() {
        debug!(cert = %cert_path.display(), "using existing certificate");
        return Ok(false);
    }

    let mut subject_alt_names = vec!["localhost".to_string()];
    if !host.is_empty() && host != "localhost" && host.parse::<IpAddr>().is_err() {
        subject_alt_names.push(host.to_string());
    }

    let cert = rcgen::generate_simple_self_signed(subject_alt_names)
        .map_err(|e| TlsError::CertificateGeneration(e.to_string()))?;
    let cert_pem = cert
        .serialize_pem()
        .map_err(|e| TlsError::CertificateGeneration(e.to_string()))?;
    let key_pem = cert.serialize_private_key_pem();

    fs::write(cert_path, cert_pem).map_err(|source| TlsError::Pem {
        path: cert_path.to_path_buf(),
        source,
    })?;
    fs::write(key_path, key_pem).map_err(|source| TlsError::Pem {
        path: key_path.to_path_buf(),
        source,
    })?;

    info!(
        cert = %cert_path.display(),
        key = %key_path.display(),
        "generated self-signed certificate"
    );
    Ok(true)
}

/// Load a PEM certificate/key pair into a TLS acceptor.
pub fn build_acceptor(cert_path: &Path, key_path: &Path) -> Result<TlsAcceptor, TlsError> {
    let certs = load_certs(cert_path)?;
    let key = load_key(key_path)?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, TlsError> {
    let file = fs::File::open(path).map_err(|source| TlsError::Pem {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| TlsError::Pem {
            path: path.to_path_buf(),
            source,
        })
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, TlsError> {
    let file = fs::File::open(path).map_err(|source| TlsError::Pem {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|source| TlsError::Pem {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| TlsError::MissingKey(path.to_path_buf()))
}
