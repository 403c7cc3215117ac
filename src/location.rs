use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage backend a resource lives on.
///
/// Determines the URI scheme of audited paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKind {
    /// Amazon S3 compatible object storage
    S3,
    /// Azure blob storage
    AzureBlob,
    /// Google Cloud Storage
    Gcs,
    /// NFS file share
    Nfs,
}

impl StorageKind {
    /// Returns the URI scheme without the `://` suffix.
    pub fn scheme(&self) -> &'static str {
        match self {
            StorageKind::S3 => "s3",
            StorageKind::AzureBlob => "az",
            StorageKind::Gcs => "gs",
            StorageKind::Nfs => "nfs",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// Root of a storage, used to turn relative paths into resource locators.
///
/// # Example
///
/// ```
/// use access_audit::{StorageKind, StorageLocation};
///
/// let location = StorageLocation::new(StorageKind::S3, "bucket");
/// assert_eq!(location.resolve("/data/file.csv"), "s3://bucket/data/file.csv");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    kind: StorageKind,
    root: String,
}

impl StorageLocation {
    /// Creates a location for the given bucket, container or share root.
    ///
    /// Trailing `/` characters on `root` are ignored.
    pub fn new(kind: StorageKind, root: impl Into<String>) -> Self {
        let root = root.into();
        Self {
            kind,
            root: root.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the storage kind.
    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    /// Returns the normalized root.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Builds `<scheme>://<root>/<path>` with exactly one separator between
    /// root and path.
    pub fn resolve(&self, path: &str) -> String {
        format!(
            "{}://{}/{}",
            self.kind.scheme(),
            self.root,
            path.trim_start_matches('/')
        )
    }
}
