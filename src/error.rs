use thiserror::Error;

/// Startup failures while resolving destinations or building clients
///
/// None of these are recoverable: callers usually log them and exit.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("METRICS_HOST is set but METRICS_PORT or METRICS_PREFIX is empty")]
    IncompleteStandard,

    #[error("METRICS_DESTINATIONS is not a JSON array of {{host, port, prefix}}: {value}")]
    InvalidDestinations {
        value: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to build a statsd client for {address}")]
    Client {
        address: String,
        #[source]
        source: cadence::MetricError,
    },

    #[error("no metrics destination configured")]
    NoDestinations,

    #[cfg(feature = "recorder")]
    #[error("a metrics recorder is already installed")]
    RecorderAlreadyInstalled,
}
