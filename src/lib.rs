//! Non-blocking capture and batched dispatch of storage access events.
//!
//! Request-handling threads record every storage read and write. This crate
//! keeps that recording off their latency budget:
//! - **Bounded admission**: producers never wait; when the buffer is full the
//!   event is dropped and counted
//! - **Background batching**: one daemon thread drains the buffer and hands
//!   batches to a sink when they reach a size threshold or a dwell timeout
//! - **Pluggable sinks**: anything implementing [`AuditConsumer`], including
//!   plain closures and the bundled [`LoggingConsumer`]
//!
//! # Core Types
//!
//! - [`AuditEntry`]: Immutable record of one access (path, kind, time, user)
//! - [`AuditContainer`]: Bounded buffer with drop-on-overflow admission
//! - [`AuditClient`]: Producer façade that resolves storage paths
//! - [`BufferingDaemon`]: Size/time batching loop feeding a consumer
//! - [`AuditConfig`]: Validated settings that start a whole pipeline
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use access_audit::{
//!     AuditConfig, LoggingConsumer, MemoryLogStore, StorageKind, StorageLocation,
//! };
//!
//! let store = Arc::new(MemoryLogStore::new());
//! let config = AuditConfig::new(1_000, 25, Duration::from_millis(200))
//!     .expect("valid settings");
//! let pipeline = config
//!     .start(LoggingConsumer::new(Arc::clone(&store), "storage-api"))
//!     .expect("daemon started");
//!
//! let client = pipeline.client(StorageLocation::new(StorageKind::S3, "bucket"));
//! client.put_write("uploads/report.pdf", "alice");
//!
//! // Shutdown drains and flushes everything still pending.
//! pipeline.shutdown();
//! assert_eq!(store.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod config;
mod consumer;
mod container;
mod daemon;
mod entry;
mod error;
mod location;

pub use client::{AuditClient, ANONYMOUS_USER};
pub use config::{
    AuditConfig, AuditPipeline, DEFAULT_BATCH_SIZE, DEFAULT_CAPACITY, DEFAULT_FLUSH_TIMEOUT,
};
pub use consumer::{
    AccessLogRecord, AuditConsumer, LogStore, LoggingConsumer, MemoryLogStore, TracingLogStore,
    AUDIT_RECORD_TYPE,
};
pub use container::AuditContainer;
pub use daemon::{BufferingDaemon, DaemonHandle, FlushTrigger, DAEMON_THREAD_NAME};
pub use entry::{AccessKind, AuditEntry};
pub use error::{ConfigError, StoreError};
pub use location::{StorageKind, StorageLocation};
