//! Pipeline settings and one-call startup.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::client::AuditClient;
use crate::consumer::AuditConsumer;
use crate::container::AuditContainer;
use crate::daemon::{BufferingDaemon, DaemonHandle};
use crate::error::ConfigError;
use crate::location::StorageLocation;

/// Default container capacity.
pub const DEFAULT_CAPACITY: usize = 10_000;
/// Default daemon batch size.
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Default daemon flush timeout.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Validated settings for one audit pipeline.
///
/// Can be deserialized from any `serde` format; the timeout is given in
/// milliseconds as `flush_timeout_ms`, and missing fields take the defaults.
/// Deserialization runs the same validation as [`AuditConfig::new`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use access_audit::AuditConfig;
///
/// let config = AuditConfig::new(1_000, 50, Duration::from_secs(2)).unwrap();
/// assert_eq!(config.batch_size(), 50);
///
/// assert!(AuditConfig::new(0, 50, Duration::from_secs(2)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawAuditConfig")]
pub struct AuditConfig {
    capacity: usize,
    batch_size: usize,
    flush_timeout: Duration,
}

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawAuditConfig {
    capacity: usize,
    batch_size: usize,
    flush_timeout_ms: u64,
}

impl Default for RawAuditConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_timeout_ms: u64::try_from(DEFAULT_FLUSH_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl TryFrom<RawAuditConfig> for AuditConfig {
    type Error = ConfigError;

    fn try_from(raw: RawAuditConfig) -> Result<Self, Self::Error> {
        Self::new(
            raw.capacity,
            raw.batch_size,
            Duration::from_millis(raw.flush_timeout_ms),
        )
    }
}

impl AuditConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first zero-valued setting.
    pub fn new(
        capacity: usize,
        batch_size: usize,
        flush_timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            capacity,
            batch_size,
            flush_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that every setting is positive.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] for the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.flush_timeout.is_zero() {
            return Err(ConfigError::ZeroFlushTimeout);
        }
        Ok(())
    }

    /// Returns the container capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the daemon batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the daemon flush timeout.
    pub fn flush_timeout(&self) -> Duration {
        self.flush_timeout
    }

    /// Builds a container and spawns a daemon feeding `consumer`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Spawn`] if the daemon thread cannot be started.
    pub fn start<C>(&self, consumer: C) -> Result<AuditPipeline, ConfigError>
    where
        C: AuditConsumer + 'static,
    {
        let container = Arc::new(AuditContainer::new(self.capacity)?);
        let handle =
            BufferingDaemon::from_config(Arc::clone(&container), consumer, self)?.spawn()?;

        Ok(AuditPipeline { container, handle })
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

/// A running container plus daemon pair.
///
/// Dropping the pipeline shuts it down, flushing whatever is left.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use access_audit::{AuditConfig, LoggingConsumer, MemoryLogStore, StorageKind, StorageLocation};
///
/// let store = Arc::new(MemoryLogStore::new());
/// let pipeline = AuditConfig::default()
///     .start(LoggingConsumer::new(Arc::clone(&store), "data-api"))
///     .unwrap();
///
/// let client = pipeline.client(StorageLocation::new(StorageKind::S3, "bucket"));
/// client.put_read("reports/q1.csv", "alice");
///
/// pipeline.shutdown();
/// assert_eq!(store.records()[0].path, "s3://bucket/reports/q1.csv");
/// ```
#[derive(Debug)]
pub struct AuditPipeline {
    container: Arc<AuditContainer>,
    handle: DaemonHandle,
}

impl AuditPipeline {
    /// Returns a client submitting to this pipeline for paths under
    /// `location`.
    pub fn client(&self, location: StorageLocation) -> AuditClient {
        AuditClient::new(Arc::clone(&self.container), location)
    }

    /// Returns the pipeline's container.
    pub fn container(&self) -> &Arc<AuditContainer> {
        &self.container
    }

    /// Returns `true` while the daemon thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// Stops admission, flushes everything left and joins the daemon.
    pub fn shutdown(self) {
        self.handle.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AuditEntry;

    #[test]
    fn defaults_are_valid() {
        let config = AuditConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity(), DEFAULT_CAPACITY);
        assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(config.flush_timeout(), DEFAULT_FLUSH_TIMEOUT);
    }

    #[test]
    fn zero_values_are_rejected() {
        let timeout = Duration::from_secs(1);
        assert!(matches!(
            AuditConfig::new(0, 1, timeout),
            Err(ConfigError::ZeroCapacity)
        ));
        assert!(matches!(
            AuditConfig::new(1, 0, timeout),
            Err(ConfigError::ZeroBatchSize)
        ));
        assert!(matches!(
            AuditConfig::new(1, 1, Duration::ZERO),
            Err(ConfigError::ZeroFlushTimeout)
        ));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: AuditConfig =
            serde_json::from_str(r#"{"capacity": 500, "flush_timeout_ms": 250}"#).unwrap();

        assert_eq!(config.capacity(), 500);
        assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(config.flush_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn empty_document_takes_defaults() {
        let config: AuditConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AuditConfig::default());
    }

    #[test]
    fn deserialization_validates() {
        let result: Result<AuditConfig, _> = serde_json::from_str(r#"{"batch_size": 0}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("batch size"));
    }

    #[test]
    fn deserialization_rejects_unknown_fields() {
        let result: Result<AuditConfig, _> = serde_json::from_str(r#"{"capacty": 10}"#);
        assert!(result.is_err());
    }

    #[test]
    fn pipeline_starts_and_stops() {
        let config = AuditConfig::new(10, 5, Duration::from_secs(3600)).unwrap();
        let pipeline = config.start(|_batch: Vec<AuditEntry>| {}).unwrap();

        assert!(pipeline.is_running());
        assert_eq!(pipeline.container().capacity(), 10);

        let container = Arc::clone(pipeline.container());
        pipeline.shutdown();
        assert!(container.is_closed());
    }
}
