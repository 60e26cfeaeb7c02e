//! Statsd emitter configured from the environment, sending every metric to all
//! configured destinations
//!
//! # Configuration
//! * `METRICS_HOST`, `METRICS_PORT`, `METRICS_PREFIX` describe a single destination
//! * `METRICS_DESTINATIONS` is a JSON array of `{"host", "port", "prefix"}` objects
//!
//! Both may be set; at least one destination is required.
//!
//! # Example
//! ```no_run
//! let metrics = statsd_fanout::Sender::from_env().unwrap();
//!
//! metrics.count("my_counter", 3);
//! metrics.increment("my_counter");
//!
//! let timing = metrics.new_timing();
//! // Do something important
//! timing.send("some_task.timing");
//! ```

pub use {
    builder::Builder,
    client::{ClientBuilder, MetricClient},
    config::ClientConfig,
    error::ConfigError,
    sender::{Sender, ToGaugeValue},
    timing::{Clock, ManualClock, SystemClock, Timing},
};

#[cfg(feature = "recorder")]
pub use recorder::StatsdRecorder;

mod builder;
pub mod client;
pub mod config;
mod error;
pub mod global;
#[cfg(feature = "recorder")]
mod recorder;
mod sender;
mod timing;
