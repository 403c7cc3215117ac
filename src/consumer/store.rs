//! Persistence seam for access log records.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::AccessLogRecord;
use crate::error::StoreError;

/// Destination for access log records.
///
/// # Errors
///
/// Implementations return [`StoreError`] when a batch cannot be persisted.
/// Whether a failed batch was partially written is up to the store.
pub trait LogStore: Send {
    /// Persists one batch of records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the records could not be stored.
    fn save(&self, records: Vec<AccessLogRecord>) -> Result<(), StoreError>;
}

impl<S> LogStore for Arc<S>
where
    S: LogStore + Sync + ?Sized,
{
    fn save(&self, records: Vec<AccessLogRecord>) -> Result<(), StoreError> {
        (**self).save(records)
    }
}

/// Thread-safe in-memory store.
///
/// Useful in tests and for inspecting what a pipeline dispatched. Share it
/// behind an `Arc` to read it while a daemon writes to it.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use access_audit::{AccessKind, AuditConsumer, AuditEntry, LoggingConsumer, MemoryLogStore};
///
/// let store = Arc::new(MemoryLogStore::new());
/// let consumer = LoggingConsumer::new(Arc::clone(&store), "data-api");
///
/// consumer.consume(vec![AuditEntry::new("s3://b/k", AccessKind::Read, "alice")]);
///
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    records: Mutex<Vec<AccessLogRecord>>,
}

impl MemoryLogStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<AccessLogRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a snapshot of all stored records, oldest first.
    pub fn records(&self) -> Vec<AccessLogRecord> {
        self.lock().clone()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Removes all stored records.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl LogStore for MemoryLogStore {
    fn save(&self, records: Vec<AccessLogRecord>) -> Result<(), StoreError> {
        self.lock().extend(records);
        Ok(())
    }
}

/// Store that emits each record as a structured `tracing` event.
///
/// Events are logged at `info` level on the `access_audit` target, with the
/// full record attached as JSON so a subscriber can ship it as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogStore;

impl TracingLogStore {
    /// Creates the store.
    pub fn new() -> Self {
        Self
    }
}

impl LogStore for TracingLogStore {
    fn save(&self, records: Vec<AccessLogRecord>) -> Result<(), StoreError> {
        // Serialize everything first so a bad record doesn't leave half a
        // batch emitted.
        let rendered = records
            .iter()
            .map(|record| serde_json::to_string(record).map(|json| (record, json)))
            .collect::<Result<Vec<_>, _>>()?;

        for (record, json) in rendered {
            tracing::info!(
                target: "access_audit",
                event_id = %record.event_id,
                user = %record.user,
                kind = %record.kind,
                path = %record.path,
                service = %record.service_name,
                record = %json,
                "access log record"
            );
        }
        Ok(())
    }
}
