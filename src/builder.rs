use super::client::{ClientBuilder, MetricClient};
use super::config::{self, ClientConfig};
use super::error::ConfigError;
use super::sender::Sender;
use cadence::MetricError;
use tracing::{info, warn};

/// Builder for the statsd [Sender]
///
/// Destinations are built in the order they were added: environment
/// destinations (standard one first, then `METRICS_DESTINATIONS`), explicit
/// configs and clients as they are passed.
///
/// # Example
/// ```no_run
///  let metrics = statsd_fanout::Builder::new()
///      .with_env()
///      .with_destination("127.0.0.1", "8125", "my_application.")
///      .build()
///      .unwrap();
/// ```
#[derive(Default)]
pub struct Builder {
    client_builder: ClientBuilder,
    sources: Vec<Source>,
}

enum Source {
    Lookup(Box<dyn Fn(&str) -> Option<String>>),
    Config(ClientConfig),
    Client(Box<dyn MetricClient>),
}

impl Builder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces the handler statsd clients call when a send fails
    /// * Defaults to logging via [tracing]
    pub fn with_error_handler(mut self, handler: fn(MetricError)) -> Self {
        self.client_builder = ClientBuilder::new(handler);
        self
    }

    /// Adds the destinations described by the process environment
    pub fn with_env(self) -> Self {
        self.with_lookup(config::env_lookup)
    }

    /// Adds the destinations described by `lookup`, read like the process environment
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.sources.push(Source::Lookup(Box::new(lookup)));
        self
    }

    /// Adds one destination
    pub fn with_destination(self, host: &str, port: &str, prefix: impl Into<String>) -> Self {
        self.with_client_config(ClientConfig::new(host, port, prefix))
    }

    pub fn with_client_config(mut self, config: ClientConfig) -> Self {
        self.sources.push(Source::Config(config));
        self
    }

    /// Adds an already constructed client, for destinations that aren't plain statsd over UDP
    pub fn with_client(mut self, client: impl MetricClient + 'static) -> Self {
        self.sources.push(Source::Client(Box::new(client)));
        self
    }

    /// Resolve every source and build the clients
    /// * Fails on the first misconfigured source
    /// * Fails with [ConfigError::NoDestinations] if nothing was configured
    pub fn build(self) -> Result<Sender, ConfigError> {
        let mut clients: Vec<Box<dyn MetricClient>> = Vec::new();

        for source in self.sources {
            match source {
                Source::Lookup(lookup) => {
                    for config in config::resolve(&lookup)? {
                        clients.push(Box::new(self.client_builder.build_client(&config)?));
                    }
                }
                Source::Config(config) => clients.push(Box::new(self.client_builder.build_client(&config)?)),
                Source::Client(client) => clients.push(client),
            }
        }

        if clients.is_empty() {
            warn!("no metrics client initialized");
            return Err(ConfigError::NoDestinations);
        }

        info!(clients = clients.len(), "metrics sender initialized");
        Ok(Sender::new(clients))
    }

    /// Build the sender and install it as the [metrics] recorder
    ///
    /// The returned sender can still be used directly.
    #[cfg(feature = "recorder")]
    pub fn install(self) -> Result<std::sync::Arc<Sender>, ConfigError> {
        let sender = std::sync::Arc::new(self.build()?);
        super::recorder::StatsdRecorder::new(sender.clone()).install()?;
        Ok(sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::tests::{Log, Recorded, RecordingClient};

    #[test]
    fn build_without_destinations() {
        let result = Builder::new().with_lookup(|_| None).build();
        assert!(matches!(result, Err(ConfigError::NoDestinations)));

        assert!(matches!(Builder::new().build(), Err(ConfigError::NoDestinations)));
    }

    #[test]
    fn build_counts_every_source() {
        let sender = Builder::new()
            .with_lookup(|name| match name {
                "METRICS_HOST" => Some("127.0.0.1".into()),
                "METRICS_PORT" => Some("8125".into()),
                "METRICS_PREFIX" => Some("standard.".into()),
                "METRICS_DESTINATIONS" => Some(
                    r#"[{"host": "127.0.0.1", "port": "8126", "prefix": "a."},
                        {"host": "127.0.0.1", "port": "8127", "prefix": "b."}]"#
                        .into(),
                ),
                _ => None,
            })
            .with_destination("127.0.0.1", "8128", "explicit.")
            .build()
            .unwrap();

        assert_eq!(sender.len(), 4);
    }

    #[test]
    fn build_fails_on_incomplete_standard() {
        let result = Builder::new()
            .with_lookup(|name| (name == "METRICS_HOST").then(|| "127.0.0.1".to_string()))
            .build();

        assert!(matches!(result, Err(ConfigError::IncompleteStandard)));
    }

    #[test]
    fn build_fails_on_bad_address() {
        let result = Builder::new().with_destination("an ill formatted host", "", "prefix.").build();
        assert!(matches!(result, Err(ConfigError::Client { .. })));
    }

    #[test]
    fn explicit_clients_keep_order() {
        let log = Log::default();
        let sender = Builder::new()
            .with_client(RecordingClient::new(7, log.clone()))
            .with_client(RecordingClient::new(3, log.clone()))
            .build()
            .unwrap();

        sender.increment("ordered");

        assert_eq!(
            *log.lock().unwrap(),
            vec![Recorded::count(7, "ordered", 1), Recorded::count(3, "ordered", 1)]
        );
    }
}
