//! Background batching of drained entries.
//!
//! The daemon turns the container's "everything that is ready" drains into
//! batches bounded by size and by dwell time. Each loop iteration runs two
//! checks in a fixed order:
//!
//! ```text
//! pull (bounded by time left until the timeout flush)
//!   -> size check:    while buffer >= batch_size, dispatch the first batch_size entries
//!   -> timeout check: if flush_timeout elapsed, dispatch whatever is buffered
//! ```
//!
//! Closing the container stops the loop after a final drain; everything still
//! resident or buffered is dispatched before the thread exits.

use std::fmt;
use std::io;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::AuditConfig;
use crate::consumer::AuditConsumer;
use crate::container::AuditContainer;
use crate::entry::AuditEntry;
use crate::error::ConfigError;

/// Name given to the spawned daemon thread.
pub const DAEMON_THREAD_NAME: &str = "audit-daemon";

/// Why a batch was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// The buffer reached the batch size
    Size,
    /// The flush timeout elapsed
    Timeout,
    /// The container was closed
    Shutdown,
}

impl fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlushTrigger::Size => write!(f, "size"),
            FlushTrigger::Timeout => write!(f, "timeout"),
            FlushTrigger::Shutdown => write!(f, "shutdown"),
        }
    }
}

/// Drains an [`AuditContainer`] and forwards size- and time-bounded batches
/// to an [`AuditConsumer`].
///
/// The buffer is owned by the daemon and never shared, so no locking happens
/// outside the container.
///
/// # Example
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
/// use access_audit::{AccessKind, AuditContainer, AuditEntry, BufferingDaemon};
///
/// let container = Arc::new(AuditContainer::new(100).unwrap());
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
///
/// let daemon = BufferingDaemon::new(
///     Arc::clone(&container),
///     move |batch: Vec<AuditEntry>| sink.lock().unwrap().push(batch.len()),
///     2,
///     Duration::from_secs(60),
/// )
/// .unwrap();
/// let handle = daemon.spawn().unwrap();
///
/// for i in 0..3 {
///     container.put(AuditEntry::new(format!("s3://b/{i}"), AccessKind::Read, "alice"));
/// }
///
/// // Shutdown flushes the leftover entry.
/// handle.shutdown();
/// assert_eq!(seen.lock().unwrap().iter().sum::<usize>(), 3);
/// ```
pub struct BufferingDaemon<C> {
    container: Arc<AuditContainer>,
    consumer: C,
    batch_size: usize,
    flush_timeout: Duration,
    buffer: Vec<AuditEntry>,
    last_flush: Instant,
    dropped_seen: u64,
}

impl<C: AuditConsumer> BufferingDaemon<C> {
    /// Creates a daemon draining `container` into `consumer`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroBatchSize`] or
    /// [`ConfigError::ZeroFlushTimeout`] for invalid settings.
    pub fn new(
        container: Arc<AuditContainer>,
        consumer: C,
        batch_size: usize,
        flush_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if flush_timeout.is_zero() {
            return Err(ConfigError::ZeroFlushTimeout);
        }

        let dropped_seen = container.dropped();
        Ok(Self {
            container,
            consumer,
            batch_size,
            flush_timeout,
            buffer: Vec::new(),
            last_flush: Instant::now(),
            dropped_seen,
        })
    }

    /// Creates a daemon using the batch size and flush timeout of `config`.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`BufferingDaemon::new`]; a config built
    /// through [`AuditConfig::new`] is already valid.
    pub fn from_config(
        container: Arc<AuditContainer>,
        consumer: C,
        config: &AuditConfig,
    ) -> Result<Self, ConfigError> {
        Self::new(
            container,
            consumer,
            config.batch_size(),
            config.flush_timeout(),
        )
    }

    /// Returns the size threshold.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the maximum dwell time of a buffered entry.
    pub fn flush_timeout(&self) -> Duration {
        self.flush_timeout
    }

    /// Runs the loop on the current thread until the container is closed.
    pub fn run(mut self) {
        tracing::info!(
            batch_size = self.batch_size,
            flush_timeout_ms = u64::try_from(self.flush_timeout.as_millis()).unwrap_or(u64::MAX),
            capacity = self.container.capacity(),
            "audit daemon started"
        );

        self.last_flush = Instant::now();
        while !self.step() {}

        self.shutdown_flush();
        tracing::info!("audit daemon stopped");
    }

    /// Runs one iteration. Returns `true` once the container is closed.
    fn step(&mut self) -> bool {
        let wait = self
            .flush_timeout
            .saturating_sub(self.last_flush.elapsed());
        let drained = self.container.pull_timeout(wait);
        self.buffer.extend(drained);

        self.flush_full_batches();
        self.flush_if_expired();
        let _ = self.report_dropped();

        self.container.is_closed()
    }

    fn flush_full_batches(&mut self) {
        if self.buffer.len() < self.batch_size {
            return;
        }

        let mut pending = mem::take(&mut self.buffer);
        while pending.len() >= self.batch_size {
            let rest = pending.split_off(self.batch_size);
            self.dispatch(pending, FlushTrigger::Size);
            pending = rest;
        }
        self.buffer = pending;

        if self.buffer.is_empty() {
            self.last_flush = Instant::now();
        }
    }

    fn flush_if_expired(&mut self) {
        if self.last_flush.elapsed() < self.flush_timeout {
            return;
        }

        if !self.buffer.is_empty() {
            let batch = mem::take(&mut self.buffer);
            self.dispatch(batch, FlushTrigger::Timeout);
        }
        self.last_flush = Instant::now();
    }

    fn shutdown_flush(&mut self) {
        let remaining = self.container.pull_timeout(Duration::ZERO);
        self.buffer.extend(remaining);

        let mut pending = mem::take(&mut self.buffer);
        while !pending.is_empty() {
            let rest = pending.split_off(self.batch_size.min(pending.len()));
            self.dispatch(pending, FlushTrigger::Shutdown);
            pending = rest;
        }
        let _ = self.report_dropped();
    }

    fn dispatch(&self, batch: Vec<AuditEntry>, trigger: FlushTrigger) {
        let count = batch.len();
        tracing::debug!(count, %trigger, "flushing audit batch");

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.consumer.consume(batch)));
        if result.is_err() {
            tracing::error!(count, %trigger, "audit consumer panicked; batch discarded");
        }
    }

    /// Logs entries dropped since the last report. Returns how many that was.
    fn report_dropped(&mut self) -> Option<u64> {
        let total = self.container.dropped();
        if total <= self.dropped_seen {
            return None;
        }

        let dropped = total - self.dropped_seen;
        tracing::warn!(
            dropped,
            total,
            capacity = self.container.capacity(),
            "audit container full; entries dropped"
        );
        self.dropped_seen = total;
        Some(dropped)
    }
}

impl<C: AuditConsumer + 'static> BufferingDaemon<C> {
    /// Starts the loop on a dedicated thread.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the OS refuses to create the thread.
    pub fn spawn(self) -> io::Result<DaemonHandle> {
        let container = Arc::clone(&self.container);
        let thread = thread::Builder::new()
            .name(DAEMON_THREAD_NAME.to_string())
            .spawn(move || self.run())?;

        Ok(DaemonHandle {
            container,
            thread: Some(thread),
        })
    }
}

impl<C> fmt::Debug for BufferingDaemon<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferingDaemon")
            .field("batch_size", &self.batch_size)
            .field("flush_timeout", &self.flush_timeout)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

/// Owner of a running daemon thread.
///
/// Dropping the handle shuts the daemon down the same way
/// [`shutdown`](Self::shutdown) does.
#[derive(Debug)]
pub struct DaemonHandle {
    container: Arc<AuditContainer>,
    thread: Option<JoinHandle<()>>,
}

impl DaemonHandle {
    /// Returns `true` while the daemon thread has not exited.
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Closes the container, waits for the daemon to dispatch everything
    /// left, and joins the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.container.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("audit daemon thread panicked");
            }
        }
    }
}

impl Drop for DaemonHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
