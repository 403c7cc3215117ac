use std::sync::Arc;

use chrono::Utc;

use crate::container::AuditContainer;
use crate::entry::{AccessKind, AuditEntry};
use crate::location::StorageLocation;

/// User recorded by the default-user methods when no default was set.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Producer-side façade over an [`AuditContainer`].
///
/// A client is bound to one storage location. It turns relative paths into
/// resource locators, stamps the time, and hands the entry to the container.
/// None of its methods wait: a full container drops the entry.
///
/// The acting user is either passed per call (`put*`) or taken from the
/// client's default user (`record*`), set with [`with_user`](Self::with_user).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use access_audit::{AccessKind, AuditClient, AuditContainer, StorageKind, StorageLocation};
///
/// let container = Arc::new(AuditContainer::new(100).unwrap());
/// let client = AuditClient::new(
///     Arc::clone(&container),
///     StorageLocation::new(StorageKind::S3, "bucket"),
/// );
///
/// client.put("reports/q1.csv", AccessKind::Read, "alice");
/// client.with_user("svc-backup").record_write("reports/q1.csv");
///
/// let entries = container.pull();
/// assert_eq!(entries[0].path(), "s3://bucket/reports/q1.csv");
/// assert_eq!(entries[1].user(), "svc-backup");
/// ```
#[derive(Debug, Clone)]
pub struct AuditClient {
    container: Arc<AuditContainer>,
    location: StorageLocation,
    default_user: Option<String>,
}

impl AuditClient {
    /// Creates a client submitting to `container` for paths under `location`.
    pub fn new(container: Arc<AuditContainer>, location: StorageLocation) -> Self {
        Self {
            container,
            location,
            default_user: None,
        }
    }

    /// Sets the user stamped by the `record*` methods.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.default_user = Some(user.into());
        self
    }

    /// Returns the storage location paths are resolved against.
    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    /// Returns the default user, if one was set.
    pub fn default_user(&self) -> Option<&str> {
        self.default_user.as_deref()
    }

    /// Records one access to `path` by `user`.
    pub fn put(&self, path: &str, kind: AccessKind, user: &str) {
        let entry = AuditEntry::new(self.location.resolve(path), kind, user);
        self.container.put(entry);
    }

    /// Records a read of `path`.
    pub fn put_read(&self, path: &str, user: &str) {
        self.put(path, AccessKind::Read, user);
    }

    /// Records a write of `path`.
    pub fn put_write(&self, path: &str, user: &str) {
        self.put(path, AccessKind::Write, user);
    }

    /// Records one access to `path` by the default user, or
    /// [`ANONYMOUS_USER`] when none was set.
    pub fn record(&self, path: &str, kind: AccessKind) {
        let user = self.default_user.as_deref().unwrap_or(ANONYMOUS_USER);
        self.put(path, kind, user);
    }

    /// Records a read of `path` by the default user.
    pub fn record_read(&self, path: &str) {
        self.record(path, AccessKind::Read);
    }

    /// Records a write of `path` by the default user.
    pub fn record_write(&self, path: &str) {
        self.record(path, AccessKind::Write);
    }

    /// Records one operation touching several paths.
    ///
    /// All entries share a single timestamp and are admitted together; those
    /// that do not fit are dropped.
    pub fn put_all<'p, I>(&self, paths: I, kind: AccessKind, user: &str)
    where
        I: IntoIterator<Item = &'p str>,
    {
        let now = Utc::now();
        let entries: Vec<AuditEntry> = paths
            .into_iter()
            .map(|path| AuditEntry::at(self.location.resolve(path), kind, user, now))
            .collect();
        self.container.put_all(entries);
    }
}
