//! Sinks for dispatched batches.
//!
//! This module provides:
//! - `AuditConsumer`: the single-method sink the daemon hands batches to
//! - `LoggingConsumer`: a consumer turning entries into access log records
//! - `LogStore`: where a `LoggingConsumer` persists its records
//! - `MemoryLogStore` and `TracingLogStore`: the bundled stores
//!
//! Consumers run on the daemon thread. A slow consumer delays the next drain
//! but never blocks producers.

mod logging;
mod record;
mod store;

pub use logging::LoggingConsumer;
pub use record::{AccessLogRecord, AUDIT_RECORD_TYPE};
pub use store::{LogStore, MemoryLogStore, TracingLogStore};

use std::sync::Arc;

use crate::entry::AuditEntry;

/// Destination for batches drained by the daemon.
///
/// `consume` may be called with an empty batch, which must be a no-op.
/// Implementations absorb their own failures; the daemon treats a return as
/// success and moves on.
///
/// Closures taking `Vec<AuditEntry>` implement this trait, and so does
/// `Arc<C>` for any shareable consumer `C`.
///
/// # Example
///
/// ```
/// use access_audit::{AccessKind, AuditConsumer, AuditEntry};
///
/// let consumer = |batch: Vec<AuditEntry>| {
///     assert!(batch.len() <= 1);
/// };
/// consumer.consume(vec![AuditEntry::new("s3://b/k", AccessKind::Read, "alice")]);
/// ```
pub trait AuditConsumer: Send {
    /// Handles one batch, in dispatch order.
    fn consume(&self, batch: Vec<AuditEntry>);
}

impl<F> AuditConsumer for F
where
    F: Fn(Vec<AuditEntry>) + Send,
{
    fn consume(&self, batch: Vec<AuditEntry>) {
        self(batch)
    }
}

impl<C> AuditConsumer for Arc<C>
where
    C: AuditConsumer + Sync + ?Sized,
{
    fn consume(&self, batch: Vec<AuditEntry>) {
        (**self).consume(batch)
    }
}
