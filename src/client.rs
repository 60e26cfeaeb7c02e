//! # Client
//!
//! Builds one statsd client per destination and defines the capability the
//! [Sender](super::Sender) fans out to

use super::config::ClientConfig;
use super::error::ConfigError;
use cadence::{Counted, Gauged, MetricError, StatsdClient, Timed, UdpMetricSink};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use tracing::error;

/// The operations a destination has to support
///
/// Sends never fail from the caller's point of view, implementations report
/// their own errors.
pub trait MetricClient: Send + Sync {
    fn count(&self, bucket: &str, n: i64);
    fn gauge(&self, bucket: &str, value: f64);
    fn timing(&self, bucket: &str, ms: u64);
}

impl MetricClient for StatsdClient {
    fn count(&self, bucket: &str, n: i64) {
        self.count_with_tags(bucket, n).send()
    }

    // A signed gauge is a delta to statsd, reset to 0 so a negative value stays absolute
    fn gauge(&self, bucket: &str, value: f64) {
        if value < 0.0 {
            self.gauge_with_tags(bucket, 0.0).send();
        }
        self.gauge_with_tags(bucket, value).send()
    }

    fn timing(&self, bucket: &str, ms: u64) {
        self.time_with_tags(bucket, ms).send()
    }
}

/// Error handler given to every client, only logs
pub fn default_error_handler(err: MetricError) {
    error!(error = %err, "error caught while sending metrics");
}

/// Factory for statsd clients sharing one error handler
#[derive(Clone, Copy)]
pub struct ClientBuilder {
    error_handler: fn(MetricError),
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            error_handler: default_error_handler,
        }
    }
}

impl ClientBuilder {
    pub fn new(error_handler: fn(MetricError)) -> Self {
        Self { error_handler }
    }

    /// Build a client sending to `config.host` with `config.prefix`
    ///
    /// The address is resolved once, here. A malformed or unresolvable address
    /// is returned as [ConfigError::Client].
    pub fn build_client(&self, config: &ClientConfig) -> Result<StatsdClient, ConfigError> {
        self.udp_sink(&config.host)
            .map(|sink| {
                StatsdClient::builder(&config.prefix, sink)
                    .with_error_handler(self.error_handler)
                    .build()
            })
            .map_err(|source| {
                error!(
                    address = %config.host,
                    prefix = %config.prefix,
                    error = %source,
                    "error creating the statsd client"
                );
                ConfigError::Client {
                    address: config.host.clone(),
                    source,
                }
            })
    }

    fn udp_sink(&self, address: &str) -> Result<UdpMetricSink, MetricError> {
        let target = address.to_socket_addrs()?.next().ok_or_else(|| {
            MetricError::from(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{address} did not resolve to any address"),
            ))
        })?;

        let local: SocketAddr = match target {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local)?;

        UdpMetricSink::from(target, socket)
    }
}
