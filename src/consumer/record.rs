//! Persisted form of an access event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entry::{AccessKind, AuditEntry};

/// Record type stamped on every access log record.
pub const AUDIT_RECORD_TYPE: &str = "audit";

/// Log record written by [`LoggingConsumer`](crate::LoggingConsumer).
///
/// Each record gets its own random `event_id`, so records built in the same
/// batch (even with identical timestamps) never collide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogRecord {
    /// Unique identifier of this record
    pub event_id: Uuid,
    /// Time of the access, copied from the entry
    pub timestamp: DateTime<Utc>,
    /// Acting user
    pub user: String,
    /// Access kind
    pub kind: AccessKind,
    /// Resource locator
    pub path: String,
    /// Human-readable summary, `"<KIND> <path>"`
    pub message: String,
    /// Name of the service that produced the record
    pub service_name: String,
    /// Always [`AUDIT_RECORD_TYPE`]
    pub record_type: String,
}

impl AccessLogRecord {
    /// Builds a record for `entry` with a fresh event id.
    pub fn from_entry(entry: &AuditEntry, service_name: &str) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: entry.timestamp(),
            user: entry.user().to_string(),
            kind: entry.kind(),
            path: entry.path().to_string(),
            message: format!("{} {}", entry.kind(), entry.path()),
            service_name: service_name.to_string(),
            record_type: AUDIT_RECORD_TYPE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_copies_entry_fields() {
        let entry = AuditEntry::new("s3://bucket/key", AccessKind::Write, "alice");
        let record = AccessLogRecord::from_entry(&entry, "data-api");

        assert_eq!(record.timestamp, entry.timestamp());
        assert_eq!(record.user, "alice");
        assert_eq!(record.kind, AccessKind::Write);
        assert_eq!(record.path, "s3://bucket/key");
        assert_eq!(record.message, "WRITE s3://bucket/key");
        assert_eq!(record.service_name, "data-api");
        assert_eq!(record.record_type, "audit");
    }

    #[test]
    fn same_entry_yields_distinct_ids() {
        let entry = AuditEntry::new("s3://bucket/key", AccessKind::Read, "bob");
        let first = AccessLogRecord::from_entry(&entry, "svc");
        let second = AccessLogRecord::from_entry(&entry, "svc");

        assert_ne!(first.event_id, second.event_id);
    }

    #[test]
    fn record_serializes_to_json() {
        let entry = AuditEntry::new("gs://b/k", AccessKind::Read, "carol");
        let record = AccessLogRecord::from_entry(&entry, "svc");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "READ");
        assert_eq!(json["record_type"], "audit");
        assert_eq!(json["event_id"], record.event_id.to_string());
    }
}
