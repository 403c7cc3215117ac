//! Access event schema.
//!
//! An [`AuditEntry`] records that one user read or wrote one resource at one
//! instant. Entries are immutable once built: fields are private and only
//! exposed through accessors.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of storage access being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessKind {
    /// Data was read from storage
    Read,
    /// Data was written to (or removed from) storage
    Write,
}

impl AccessKind {
    /// Returns the upper-case label used in log records.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessKind::Read => "READ",
            AccessKind::Write => "WRITE",
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One data-access event.
///
/// The timestamp is taken when the entry is built, which is as close to the
/// access itself as the producer gets. Dispatch happens later and does not
/// touch it.
///
/// # Example
///
/// ```
/// use access_audit::{AccessKind, AuditEntry};
///
/// let entry = AuditEntry::new("s3://bucket/data.csv", AccessKind::Read, "alice");
///
/// assert_eq!(entry.path(), "s3://bucket/data.csv");
/// assert_eq!(entry.kind(), AccessKind::Read);
/// assert_eq!(entry.user(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Fully qualified resource locator
    path: String,
    kind: AccessKind,
    timestamp: DateTime<Utc>,
    /// Acting user
    user: String,
}

impl AuditEntry {
    /// Creates an entry stamped with the current UTC time.
    pub fn new(path: impl Into<String>, kind: AccessKind, user: impl Into<String>) -> Self {
        Self::at(path, kind, user, Utc::now())
    }

    /// Creates an entry with an explicit timestamp.
    ///
    /// Used when several entries describe the same operation and must share
    /// one instant.
    pub fn at(
        path: impl Into<String>,
        kind: AccessKind,
        user: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            timestamp,
            user: user.into(),
        }
    }

    /// Returns the resource locator.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the access kind.
    pub fn kind(&self) -> AccessKind {
        self.kind
    }

    /// Returns the moment the entry was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the acting user.
    pub fn user(&self) -> &str {
        &self.user
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuditEntry[kind={}, path={}, user={}, timestamp={}]",
            self.kind,
            self.path,
            self.user,
            self.timestamp.to_rfc3339()
        )
    }
}
