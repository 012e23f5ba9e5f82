//! Namespace construction.
//!
//! Turns a list of volume descriptors into the immutable `Namespace`: one
//! prefix binding per usable volume, each with its own `LocalFs` backend
//! and lock-system instance, plus the synthetic root handler serving the
//! volume listing at `/`. Built once at startup; the router only ever
//! reads it.

use crate::synthetic::SyntheticRootFs;
use crate::volume::VolumeDescriptor;
use dav_server::localfs::LocalFs;
use dav_server::memls::MemLs;
use dav_server::DavHandler;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};

/// A path prefix bound to a per-volume WebDAV backend.
///
/// Each binding owns an independent lock-system instance; locks acquired
/// through one volume's backend are invisible to every other volume.
pub struct Binding {
    /// The volume identifier (first path segment, no slash).
    pub identifier: String,
    /// The bound prefix, always `/<identifier>`.
    pub prefix: String,
    /// The volume's filesystem root.
    pub root_path: PathBuf,
    handler: DavHandler,
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("identifier", &self.identifier)
            .field("prefix", &self.prefix)
            .field("root_path", &self.root_path)
            .finish_non_exhaustive()
    }
}

impl Binding {
    fn new(descriptor: &VolumeDescriptor) -> Self {
        let identifier = descriptor.identifier.to_lowercase();
        let prefix = format!("/{identifier}");

        let handler = DavHandler::builder()
            .filesystem(LocalFs::new(&descriptor.root_path, false, false, false))
            .locksystem(MemLs::new())
            .strip_prefix(prefix.clone())
            .autoindex(true)
            .build_handler();

        Self {
            identifier,
            prefix,
            root_path: descriptor.root_path.clone(),
            handler,
        }
    }

    /// The WebDAV handler serving this volume.
    pub fn handler(&self) -> &DavHandler {
        &self.handler
    }
}

/// The complete addressing scheme: synthetic root plus ordered bindings.
///
/// Read-only after construction. The server shares it across request
/// tasks behind an `Arc`; no synchronization is needed because nothing is
/// ever mutated in place.
pub struct Namespace {
    root: DavHandler,
    bindings: Vec<Binding>,
}

impl Namespace {
    /// Build a namespace from discovered descriptors.
    ///
    /// Never fails: unusable volumes are skipped, and when two descriptors
    /// normalize to the same prefix the later one is discarded. An empty
    /// descriptor list yields a namespace that serves an empty listing at
    /// `/` and nothing else.
    pub fn build(descriptors: &[VolumeDescriptor]) -> Self {
        let mut bindings: Vec<Binding> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for descriptor in descriptors {
            if !descriptor.usable {
                debug!(
                    identifier = %descriptor.identifier,
                    root = %descriptor.root_path.display(),
                    "skipping unready volume"
                );
                continue;
            }

            let binding = Binding::new(descriptor);
            if !seen.insert(binding.prefix.clone()) {
                warn!(
                    prefix = %binding.prefix,
                    root = %descriptor.root_path.display(),
                    "prefix already bound, discarding volume"
                );
                continue;
            }

            debug!(
                prefix = %binding.prefix,
                root = %binding.root_path.display(),
                "bound volume"
            );
            bindings.push(binding);
        }

        let volumes: Vec<String> = bindings.iter().map(|b| b.identifier.clone()).collect();
        let root = DavHandler::builder()
            .filesystem(Box::new(SyntheticRootFs::new(volumes)))
            .locksystem(MemLs::new())
            .autoindex(true)
            .build_handler();

        Self { root, bindings }
    }

    /// The handler serving the synthetic root at `/`.
    pub fn root_handler(&self) -> &DavHandler {
        &self.root
    }

    /// The bindings, in registration order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Find the binding whose identifier equals the given path segment.
    ///
    /// Registration-order scan; prefixes are unique so at most one
    /// binding can match.
    pub fn find(&self, segment: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.identifier == segment)
    }
}
