//! # Config
//!
//! Resolves metrics destinations from environment variables
//!
//! Two shapes are supported and may be combined:
//! * `METRICS_HOST`, `METRICS_PORT`, `METRICS_PREFIX` for a single destination
//! * `METRICS_DESTINATIONS`, a JSON array of `{"host", "port", "prefix"}` objects

use super::error::ConfigError;
use serde::Deserialize;
use tracing::{error, info};

pub const METRICS_HOST: &str = "METRICS_HOST";
pub const METRICS_PORT: &str = "METRICS_PORT";
pub const METRICS_PREFIX: &str = "METRICS_PREFIX";
pub const METRICS_DESTINATIONS: &str = "METRICS_DESTINATIONS";

/// Normalized configuration handed to the client factory
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// `host:port`
    pub host: String,
    pub prefix: String,
}

impl ClientConfig {
    pub fn new(host: &str, port: &str, prefix: impl Into<String>) -> Self {
        Self {
            host: format!("{host}:{port}"),
            prefix: prefix.into(),
        }
    }
}

/// One entry of `METRICS_DESTINATIONS`
///
/// The upper-case names are accepted for configurations written against the
/// standard variable names.
#[derive(Debug, Deserialize)]
struct Destination {
    #[serde(alias = "METRICS_HOST")]
    host: String,
    #[serde(alias = "METRICS_PORT")]
    port: String,
    #[serde(alias = "METRICS_PREFIX")]
    prefix: String,
}

impl From<Destination> for ClientConfig {
    fn from(destination: Destination) -> Self {
        ClientConfig::new(&destination.host, &destination.port, destination.prefix)
    }
}

/// Reads a variable, treating an empty value like an unset one
fn lookup_non_empty<L>(lookup: &L, name: &str) -> Option<String>
where
    L: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|value| !value.is_empty())
}

/// Lookup backed by the process environment
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve the standard `METRICS_HOST` / `METRICS_PORT` / `METRICS_PREFIX` destination
///
/// * Returns `Ok(None)` when `METRICS_HOST` is empty, whatever the other two contain
/// * A host without port or prefix is a misconfiguration
pub fn standard_config<L>(lookup: &L) -> Result<Option<ClientConfig>, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let Some(host) = lookup_non_empty(lookup, METRICS_HOST) else {
        info!("METRICS_HOST empty, not initializing a client for the standard configuration");
        return Ok(None);
    };

    let port = lookup_non_empty(lookup, METRICS_PORT);
    let prefix = lookup_non_empty(lookup, METRICS_PREFIX);

    match (port, prefix) {
        (Some(port), Some(prefix)) => Ok(Some(ClientConfig::new(&host, &port, prefix))),
        _ => {
            error!(%host, "standard metrics configuration can not have an empty port or prefix");
            Err(ConfigError::IncompleteStandard)
        }
    }
}

/// Resolve every destination listed in `METRICS_DESTINATIONS`, keeping array order
pub fn destination_configs<L>(lookup: &L) -> Result<Vec<ClientConfig>, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup_non_empty(lookup, METRICS_DESTINATIONS) else {
        info!("METRICS_DESTINATIONS empty, not initializing clients for the destination list");
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<Destination>>(&value) {
        Ok(destinations) => Ok(destinations.into_iter().map(ClientConfig::from).collect()),
        Err(source) => {
            error!(metrics_destinations = %value, error = %source, "unable to parse METRICS_DESTINATIONS");
            Err(ConfigError::InvalidDestinations { value, source })
        }
    }
}

/// Both shapes combined: the standard destination first, then the list
pub fn resolve<L>(lookup: &L) -> Result<Vec<ClientConfig>, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let mut configs: Vec<ClientConfig> = standard_config(lookup)?.into_iter().collect();
    configs.extend(destination_configs(lookup)?);
    Ok(configs)
}
