//! WebDAV server exposing local volumes as a single HTTPS namespace.
//!
//! Every mounted, usable volume on the host becomes a top-level directory
//! in one WebDAV tree: `/x/...` maps to the root of volume `x`, and `/`
//! serves a synthetic listing of the discovered volumes. Clients connect
//! over HTTPS with basic authentication and mount the share with any
//! WebDAV client (Finder, Explorer, davfs2).
//!
//! # How It Works
//!
//! 1. At startup, [`VolumeSource`] enumerates the mounted volumes.
//! 2. [`Namespace::build`] turns the descriptors into prefix bindings,
//!    each backed by its own filesystem handler and lock-system instance,
//!    plus the synthetic root listing.
//! 3. The server accepts TLS connections, applies the basic-auth gate and
//!    lets the [`Router`] dispatch each request by its first path segment.
//!
//! The namespace is built once and never mutated; request tasks share it
//! by reference. Lock state is scoped per volume: a lock taken on
//! `/c/report.txt` has no effect on `/d/report.txt`.
//!
//! # Example
//!
//! ```ignore
//! use drivedav::{
//!     BasicAuth, Namespace, ServerConfig, SystemVolumeSource, VolumeSource, WebDavServer,
//! };
//!
//! let descriptors = SystemVolumeSource::new().discover()?;
//! let namespace = Namespace::build(&descriptors);
//!
//! let acceptor = drivedav::tls::build_acceptor(cert_path, key_path)?;
//! let server = WebDavServer::start(
//!     namespace,
//!     BasicAuth::new("root", password),
//!     acceptor,
//!     ServerConfig::default(),
//! )
//! .await?;
//!
//! println!("Serving at {}", server.url());
//! ```

mod auth;
mod error;
mod namespace;
mod router;
mod server;
mod synthetic;
pub mod tls;
mod volume;

// Public exports
pub use auth::BasicAuth;
pub use error::{EnumerationError, ServerError, TlsError};
pub use namespace::{Binding, Namespace};
pub use router::{route_decision, RouteDecision, Router};
pub use server::{ServerConfig, WebDavServer};
pub use synthetic::SyntheticRootFs;
pub use volume::{StaticVolumeSource, SystemVolumeSource, VolumeDescriptor, VolumeSource};
