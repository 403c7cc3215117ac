use super::{AccessLogRecord, AuditConsumer, LogStore};
use crate::entry::AuditEntry;

/// Consumer that converts entries into [`AccessLogRecord`]s and saves them
/// to a [`LogStore`].
///
/// Store failures are logged and swallowed, so `consume` always returns
/// normally.
#[derive(Debug)]
pub struct LoggingConsumer<S> {
    store: S,
    service_name: String,
}

impl<S: LogStore> LoggingConsumer<S> {
    /// Creates a consumer writing to `store`, tagging records with
    /// `service_name`.
    pub fn new(store: S, service_name: impl Into<String>) -> Self {
        Self {
            store,
            service_name: service_name.into(),
        }
    }

    /// Returns the service name stamped on records.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: LogStore> AuditConsumer for LoggingConsumer<S> {
    fn consume(&self, batch: Vec<AuditEntry>) {
        if batch.is_empty() {
            return;
        }

        let records: Vec<AccessLogRecord> = batch
            .iter()
            .map(|entry| AccessLogRecord::from_entry(entry, &self.service_name))
            .collect();
        let count = records.len();

        if let Err(err) = self.store.save(records) {
            tracing::error!(
                service = %self.service_name,
                count,
                error = %err,
                "failed to persist access log records"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::MemoryLogStore;
    use crate::entry::AccessKind;
    use crate::error::StoreError;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FailingStore {
        calls: AtomicUsize,
    }

    impl LogStore for FailingStore {
        fn save(&self, _records: Vec<AccessLogRecord>) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn batch(n: usize) -> Vec<AuditEntry> {
        (0..n)
            .map(|i| AuditEntry::new(format!("s3://b/{i}"), AccessKind::Read, "alice"))
            .collect()
    }

    #[test]
    fn empty_batch_is_noop() {
        let store = Arc::new(MemoryLogStore::new());
        let consumer = LoggingConsumer::new(Arc::clone(&store), "svc");

        consumer.consume(Vec::new());

        assert!(store.is_empty());
    }

    #[test]
    fn records_get_distinct_ids() {
        let store = Arc::new(MemoryLogStore::new());
        let consumer = LoggingConsumer::new(Arc::clone(&store), "svc");

        consumer.consume(batch(50));

        let ids: HashSet<_> = store.records().iter().map(|r| r.event_id).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn records_keep_batch_order_and_service() {
        let store = Arc::new(MemoryLogStore::new());
        let consumer = LoggingConsumer::new(Arc::clone(&store), "data-api");

        consumer.consume(batch(3));

        let records = store.records();
        assert_eq!(records[0].path, "s3://b/0");
        assert_eq!(records[2].path, "s3://b/2");
        assert!(records.iter().all(|r| r.service_name == "data-api"));
        assert_eq!(consumer.service_name(), "data-api");
    }

    #[test]
    fn store_failure_is_absorbed() {
        let consumer = LoggingConsumer::new(
            FailingStore {
                calls: AtomicUsize::new(0),
            },
            "svc",
        );

        consumer.consume(batch(2));
        consumer.consume(batch(1));

        assert_eq!(consumer.store().calls.load(Ordering::SeqCst), 2);
    }
}
