//! Synthetic root filesystem.
//!
//! An in-memory `DavFileSystem` with exactly one level of synthetic
//! directories, one per bound volume. Its sole purpose is to make `/` list
//! the discovered volumes; real traffic for `/x/...` (including the bare
//! `/x`) is routed to the volume's own backend and never reaches this
//! filesystem. The structure is read-only: nothing can be opened or
//! created beneath it.

use dav_server::davpath::DavPath;
use dav_server::fs::{
    DavDirEntry, DavFile, DavFileSystem, DavMetaData, FsError, FsFuture, FsStream, OpenOptions,
    ReadDirMeta,
};
use futures::stream;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::trace;

/// In-memory filesystem serving the volume listing at `/`.
#[derive(Debug, Clone)]
pub struct SyntheticRootFs {
    /// Volume identifiers, in binding order.
    volumes: Arc<Vec<String>>,
    /// Timestamp reported for the root and every synthetic directory.
    created: SystemTime,
}

impl SyntheticRootFs {
    /// Create a synthetic root listing the given volume identifiers.
    pub fn new(volumes: Vec<String>) -> Self {
        Self {
            volumes: Arc::new(volumes),
            created: SystemTime::now(),
        }
    }

    /// The identifiers listed at the root.
    pub fn volumes(&self) -> &[String] {
        &self.volumes
    }

    /// Normalize a WebDAV path: no leading or trailing slashes, empty for
    /// the root itself.
    fn parse_path(path: &DavPath) -> String {
        path.as_url_string()
            .trim_start_matches('/')
            .trim_end_matches('/')
            .to_string()
    }

    fn lookup(&self, path: &DavPath) -> Result<SyntheticMetaData, FsError> {
        let name = Self::parse_path(path);
        if name.is_empty() {
            return Ok(SyntheticMetaData::new(self.created));
        }
        // Only one level exists; anything deeper is not ours.
        if !name.contains('/') && self.volumes.iter().any(|v| v == &name) {
            return Ok(SyntheticMetaData::new(self.created));
        }
        Err(FsError::NotFound)
    }
}

impl DavFileSystem for SyntheticRootFs {
    fn open<'a>(
        &'a self,
        path: &'a DavPath,
        _options: OpenOptions,
    ) -> FsFuture<'a, Box<dyn DavFile>> {
        // No files exist here and none can be created.
        trace!(path = %path.as_url_string(), "open rejected on synthetic root");
        Box::pin(async move { Err(FsError::Forbidden) })
    }

    fn read_dir<'a>(
        &'a self,
        path: &'a DavPath,
        _meta: ReadDirMeta,
    ) -> FsFuture<'a, FsStream<Box<dyn DavDirEntry>>> {
        Box::pin(async move {
            let name = Self::parse_path(path);

            if name.is_empty() {
                let entries: Vec<Box<dyn DavDirEntry>> = self
                    .volumes
                    .iter()
                    .map(|volume| {
                        Box::new(VolumeDirEntry {
                            name: volume.clone(),
                            modified: self.created,
                        }) as Box<dyn DavDirEntry>
                    })
                    .collect();
                trace!(count = entries.len(), "listing synthetic root");
                return Ok(Box::pin(stream::iter(entries.into_iter().map(Ok))) as FsStream<_>);
            }

            // Synthetic volume directories are empty.
            self.lookup(path)?;
            Ok(Box::pin(stream::empty()) as FsStream<_>)
        })
    }

    fn metadata<'a>(&'a self, path: &'a DavPath) -> FsFuture<'a, Box<dyn DavMetaData>> {
        Box::pin(async move {
            let meta = self.lookup(path)?;
            Ok(Box::new(meta) as Box<dyn DavMetaData>)
        })
    }
}

/// Metadata for the synthetic root and its volume directories.
///
/// Every entry is an empty directory sharing the namespace build
/// timestamp.
#[derive(Debug, Clone)]
pub struct SyntheticMetaData {
    modified: SystemTime,
}

impl SyntheticMetaData {
    fn new(modified: SystemTime) -> Self {
        Self { modified }
    }
}

impl DavMetaData for SyntheticMetaData {
    fn len(&self) -> u64 {
        0
    }

    fn modified(&self) -> Result<SystemTime, FsError> {
        Ok(self.modified)
    }

    fn is_dir(&self) -> bool {
        true
    }

    fn is_file(&self) -> bool {
        false
    }

    fn created(&self) -> Result<SystemTime, FsError> {
        Ok(self.modified)
    }
}

/// One volume directory entry in the root listing.
#[derive(Debug, Clone)]
struct VolumeDirEntry {
    name: String,
    modified: SystemTime,
}

impl DavDirEntry for VolumeDirEntry {
    fn name(&self) -> Vec<u8> {
        self.name.as_bytes().to_vec()
    }

    fn metadata(&self) -> FsFuture<'_, Box<dyn DavMetaData>> {
        let meta = SyntheticMetaData::new(self.modified);
        Box::pin(async move { Ok(Box::new(meta) as Box<dyn DavMetaData>) })
    }

    fn is_dir(&self) -> FsFuture<'_, bool> {
        Box::pin(async { Ok(true) })
    }

    fn is_file(&self) -> FsFuture<'_, bool> {
        Box::pin(async { Ok(false) })
    }
}
