//! Error taxonomies for volume discovery, TLS bootstrap and the server.
//!
//! Only startup errors are fatal: a failed volume enumeration, a broken
//! certificate bootstrap or an unbindable listen address abort the process
//! before it starts serving. Everything else degrades per volume or per
//! request.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The platform volume query itself failed.
///
/// Individual volumes that are merely not ready are skipped during
/// discovery and never reported through this type.
#[derive(Debug, Error)]
pub enum EnumerationError {
    /// The platform API call could not be performed.
    #[error("volume enumeration failed: {0}")]
    Platform(String),

    /// IO error while talking to the platform.
    #[error("volume enumeration IO error: {0}")]
    Io(#[from] io::Error),
}

/// Certificate bootstrap or TLS configuration failure.
#[derive(Debug, Error)]
pub enum TlsError {
    /// Self-signed certificate generation failed.
    #[error("certificate generation failed: {0}")]
    CertificateGeneration(String),

    /// A PEM file could not be read or written.
    #[error("failed to access {path}: {source}")]
    Pem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The key file contained no usable private key.
    #[error("no private key found in {0}")]
    MissingKey(PathBuf),

    /// rustls rejected the certificate/key pair.
    #[error("invalid certificate/key pair: {0}")]
    Config(#[from] rustls::Error),
}

/// Server lifecycle failure.
///
/// Per-connection accept and handshake errors are logged by the server
/// loop and never surface here.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: io::Error,
    },
}
