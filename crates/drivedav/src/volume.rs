//! Volume discovery.
//!
//! This module provides the `VolumeSource` capability trait and its two
//! implementations: `SystemVolumeSource`, which queries the host through
//! `sysinfo`, and `StaticVolumeSource`, which serves a fixed descriptor
//! list for tests and synthetic setups. Everything downstream of discovery
//! (namespace construction, routing) is platform independent.

use crate::error::EnumerationError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use sysinfo::Disks;
use tracing::{debug, trace};

/// Filesystems that never back a useful WebDAV root.
const VIRTUAL_FILESYSTEMS: &[&str] = &[
    "devfs", "sysfs", "proc", "tmpfs", "ramfs", "devtmpfs", "overlay",
];

/// One discovered mountable unit.
///
/// Descriptors are created once per enumeration pass and are immutable.
/// A descriptor whose readiness probe failed keeps `usable = false` and is
/// dropped by the namespace builder rather than surfaced as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeDescriptor {
    /// Short lowercase token derived from the platform mount name,
    /// used as the path prefix (`/<identifier>`).
    pub identifier: String,
    /// Filesystem root for this volume.
    pub root_path: PathBuf,
    /// Whether the readiness probe succeeded.
    pub usable: bool,
}

impl VolumeDescriptor {
    /// Create a descriptor and probe it for readiness.
    pub fn probed(identifier: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        let root_path = root_path.into();
        let usable = probe_ready(&root_path);
        Self {
            identifier: identifier.into(),
            root_path,
            usable,
        }
    }

    /// Create a descriptor with an explicit readiness flag.
    pub fn new(
        identifier: impl Into<String>,
        root_path: impl Into<PathBuf>,
        usable: bool,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            root_path: root_path.into(),
            usable,
        }
    }
}

/// Source of mounted volumes usable as WebDAV roots.
///
/// The aggregate call only fails when the host query itself cannot be
/// performed; volumes that are merely not ready are returned with
/// `usable = false` or skipped entirely. Ordering is stable across
/// repeated calls within one process lifetime.
pub trait VolumeSource {
    /// Enumerate the currently mounted volumes.
    fn discover(&self) -> Result<Vec<VolumeDescriptor>, EnumerationError>;
}

/// Volume source backed by the host's mount table via `sysinfo`.
#[derive(Debug, Default)]
pub struct SystemVolumeSource;

impl SystemVolumeSource {
    /// Create a new system volume source.
    pub fn new() -> Self {
        Self
    }
}

impl VolumeSource for SystemVolumeSource {
    fn discover(&self) -> Result<Vec<VolumeDescriptor>, EnumerationError> {
        let disks = Disks::new_with_refreshed_list();

        let mut seen_roots: HashSet<PathBuf> = HashSet::new();
        let mut descriptors = Vec::new();

        for disk in disks.list() {
            let mount_point = disk.mount_point().to_path_buf();
            let file_system = disk.file_system().to_string_lossy().to_string();

            if is_virtual_filesystem(&file_system) {
                trace!(mount = %mount_point.display(), fs = %file_system, "skipping virtual filesystem");
                continue;
            }
            if !seen_roots.insert(mount_point.clone()) {
                trace!(mount = %mount_point.display(), "skipping duplicate mount point");
                continue;
            }

            let Some(identifier) = derive_identifier(&mount_point) else {
                debug!(mount = %mount_point.display(), "skipping volume with unusable mount name");
                continue;
            };

            let descriptor = VolumeDescriptor::probed(identifier, mount_point);
            if !descriptor.usable {
                debug!(
                    identifier = %descriptor.identifier,
                    root = %descriptor.root_path.display(),
                    "volume not ready, excluding"
                );
            }
            descriptors.push(descriptor);
        }

        Ok(descriptors)
    }
}

/// Volume source serving a fixed descriptor list.
///
/// Used by tests and synthetic setups; can also be configured to fail the
/// enumeration outright to exercise startup error handling.
#[derive(Debug, Clone, Default)]
pub struct StaticVolumeSource {
    descriptors: Vec<VolumeDescriptor>,
    error: Option<String>,
}

impl StaticVolumeSource {
    /// Create a source returning the given descriptors.
    pub fn new(descriptors: Vec<VolumeDescriptor>) -> Self {
        Self {
            descriptors,
            error: None,
        }
    }

    /// Create a source whose enumeration always fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            descriptors: Vec::new(),
            error: Some(message.into()),
        }
    }
}

impl VolumeSource for StaticVolumeSource {
    fn discover(&self) -> Result<Vec<VolumeDescriptor>, EnumerationError> {
        match &self.error {
            Some(message) => Err(EnumerationError::Platform(message.clone())),
            None => Ok(self.descriptors.clone()),
        }
    }
}

/// Whether a filesystem name denotes a virtual (non-storage) filesystem.
fn is_virtual_filesystem(fs: &str) -> bool {
    VIRTUAL_FILESYSTEMS.contains(&fs.to_lowercase().as_str())
}

/// Readiness probe: the volume root can be opened and read.
///
/// Covers removable drives with no media present and transient access
/// failures; either way the volume is excluded rather than reported.
fn probe_ready(root: &Path) -> bool {
    fs::read_dir(root).is_ok()
}

/// Derive a path-prefix identifier from a mount point.
///
/// Windows drive roots (`C:\`) map to their lowercase letter. Other mount
/// points use their final path component, with the filesystem root itself
/// mapping to `root`. Characters outside `[a-z0-9._-]` become `-`.
/// Returns `None` when nothing usable remains.
fn derive_identifier(mount_point: &Path) -> Option<String> {
    let raw = mount_point.to_string_lossy();

    // Drive-letter roots: "C:" or "C:\"
    let mut chars = raw.chars();
    if let (Some(letter), Some(':')) = (chars.next(), chars.next()) {
        if letter.is_ascii_alphabetic() && chars.as_str().trim_matches(['\\', '/']).is_empty() {
            return Some(letter.to_ascii_lowercase().to_string());
        }
    }

    let name = match mount_point.file_name() {
        Some(name) => name.to_string_lossy().to_string(),
        // The filesystem root has no file name.
        None => return Some("root".to_string()),
    };

    let sanitized: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches('-').to_string();

    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized)
    }
}
