use std::io;

use thiserror::Error;

/// Errors raised while building an audit pipeline.
///
/// Every variant is reported before any thread is started, so a pipeline
/// either starts fully configured or not at all.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The container capacity was zero.
    #[error("container capacity must be at least 1")]
    ZeroCapacity,

    /// The daemon batch size was zero.
    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    /// The daemon flush timeout was zero.
    #[error("flush timeout must be greater than zero")]
    ZeroFlushTimeout,

    /// The daemon thread could not be spawned.
    #[error("failed to spawn audit daemon thread: {0}")]
    Spawn(#[from] io::Error),
}

/// Error returned by a [`LogStore`](crate::LogStore) when records cannot be
/// persisted.
///
/// [`LoggingConsumer`](crate::LoggingConsumer) absorbs these; they never reach
/// the daemon.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store rejected or could not accept the write.
    #[error("log store unavailable: {0}")]
    Unavailable(String),

    /// A record could not be serialized for the store.
    #[error("failed to serialize access log record: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::ZeroCapacity.to_string(),
            "container capacity must be at least 1"
        );
        assert_eq!(
            ConfigError::ZeroBatchSize.to_string(),
            "batch size must be at least 1"
        );
        assert!(ConfigError::ZeroFlushTimeout
            .to_string()
            .contains("flush timeout"));
    }

    #[test]
    fn spawn_error_wraps_io_error() {
        let err: ConfigError = io::Error::new(io::ErrorKind::Other, "no threads").into();
        assert!(matches!(err, ConfigError::Spawn(_)));
        assert!(err.to_string().contains("no threads"));
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::Unavailable("disk full".to_string());
        assert_eq!(err.to_string(), "log store unavailable: disk full");
    }
}
