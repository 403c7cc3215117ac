//! Bounded staging area between producers and the daemon.
//!
//! Admission never waits: an entry that does not fit is dropped and counted.
//! Extraction waits, optionally with a timeout, and always takes everything
//! that is resident.

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::entry::AuditEntry;
use crate::error::ConfigError;

#[derive(Debug, Default)]
struct State {
    entries: Vec<AuditEntry>,
    closed: bool,
}

/// Thread-safe bounded buffer of [`AuditEntry`] values.
///
/// # Semantics
///
/// - [`put`](Self::put) and [`put_all`](Self::put_all) never wait for space.
///   Entries beyond `capacity` are discarded silently.
/// - [`pull`](Self::pull) waits until at least one entry is resident, then
///   removes all of them in insertion order.
/// - [`pull_timeout`](Self::pull_timeout) does the same but gives up after
///   the timeout and returns an empty `Vec`.
/// - [`close`](Self::close) wakes every waiter. After that, admission drops
///   everything and pulls return immediately.
///
/// # Example
///
/// ```
/// use access_audit::{AccessKind, AuditContainer, AuditEntry};
///
/// let container = AuditContainer::new(2).unwrap();
/// container.put(AuditEntry::new("s3://b/1", AccessKind::Read, "alice"));
/// container.put(AuditEntry::new("s3://b/2", AccessKind::Read, "alice"));
/// container.put(AuditEntry::new("s3://b/3", AccessKind::Read, "alice"));
///
/// assert_eq!(container.dropped(), 1);
///
/// let drained = container.pull();
/// assert_eq!(drained.len(), 2);
/// assert!(container.is_empty());
/// ```
#[derive(Debug)]
pub struct AuditContainer {
    capacity: usize,
    state: Mutex<State>,
    available: Condvar,
    dropped: AtomicU64,
}

impl AuditContainer {
    /// Creates an empty container holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        Ok(Self {
            capacity,
            state: Mutex::new(State {
                entries: Vec::with_capacity(capacity),
                closed: false,
            }),
            available: Condvar::new(),
            dropped: AtomicU64::new(0),
        })
    }

    // The state is a plain Vec plus a flag, so it stays consistent even if a
    // holder panicked.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admits one entry, or drops it when the container is full or closed.
    pub fn put(&self, entry: AuditEntry) {
        let admitted = {
            let mut state = self.lock();
            if !state.closed && state.entries.len() < self.capacity {
                state.entries.push(entry);
                true
            } else {
                false
            }
        };

        if admitted {
            self.available.notify_one();
        } else {
            self.record_dropped(1);
        }
    }

    /// Admits entries in order until the container is full.
    ///
    /// The tail that does not fit is dropped. Calling this is equivalent to
    /// calling [`put`](Self::put) for each entry, except the lock is taken
    /// once.
    pub fn put_all<I>(&self, entries: I)
    where
        I: IntoIterator<Item = AuditEntry>,
    {
        let mut admitted = 0usize;
        let mut rejected = 0u64;
        {
            let mut state = self.lock();
            for entry in entries {
                if !state.closed && state.entries.len() < self.capacity {
                    state.entries.push(entry);
                    admitted += 1;
                } else {
                    rejected += 1;
                }
            }
        }

        if admitted > 0 {
            self.available.notify_one();
        }
        if rejected > 0 {
            self.record_dropped(rejected);
        }
    }

    fn record_dropped(&self, count: u64) {
        self.dropped.fetch_add(count, Ordering::Relaxed);
        tracing::trace!(count, capacity = self.capacity, "audit entries dropped");
    }

    /// Waits until at least one entry is resident and takes all of them.
    ///
    /// Returns immediately once the container is closed, with whatever is
    /// left (possibly nothing).
    pub fn pull(&self) -> Vec<AuditEntry> {
        let state = self.lock();
        let mut state = self
            .available
            .wait_while(state, |s| s.entries.is_empty() && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);
        mem::take(&mut state.entries)
    }

    /// Like [`pull`](Self::pull), but returns an empty `Vec` if nothing is
    /// admitted within `timeout`.
    pub fn pull_timeout(&self, timeout: Duration) -> Vec<AuditEntry> {
        let state = self.lock();
        let (mut state, _) = self
            .available
            .wait_timeout_while(state, timeout, |s| s.entries.is_empty() && !s.closed)
            .unwrap_or_else(PoisonError::into_inner);
        mem::take(&mut state.entries)
    }

    /// Stops admission and wakes every waiting puller.
    ///
    /// Entries already resident stay until pulled.
    pub fn close(&self) {
        self.lock().closed = true;
        self.available.notify_all();
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns how many entries have been dropped since construction.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
