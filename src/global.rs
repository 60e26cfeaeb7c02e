//! # Global
//!
//! Process-wide [Sender] built from the environment on first use
//!
//! Prefer passing a [Sender] around; these helpers exist for code that has no
//! natural place to hold one.

use super::error::ConfigError;
use super::sender::{Sender, ToGaugeValue};
use super::timing::Timing;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::trace;

static SENDER: OnceLock<Result<Sender, ConfigError>> = OnceLock::new();

/// The shared sender, built from the environment by the first call
///
/// The outcome of that first build is kept: later calls return the same
/// instance, or the same error, even if the environment changed.
pub fn get_sender() -> Result<&'static Sender, &'static ConfigError> {
    SENDER.get_or_init(Sender::from_env).as_ref()
}

// The build already logged why it failed, don't repeat it for every metric
fn with_sender(f: impl FnOnce(&'static Sender)) {
    match get_sender() {
        Ok(sender) => f(sender),
        Err(err) => trace!(error = %err, "metrics sender unavailable, dropping metric"),
    }
}

/// [Sender::count] on the shared sender
pub fn count(bucket: &str, n: i64) {
    with_sender(|sender| sender.count(bucket, n))
}

/// [Sender::increment] on the shared sender
pub fn increment(bucket: &str) {
    with_sender(|sender| sender.increment(bucket))
}

/// [Sender::gauge] on the shared sender
pub fn gauge(bucket: &str, value: impl ToGaugeValue) {
    let value = value.to_gauge_value();
    with_sender(|sender| sender.gauge(bucket, value))
}

/// [Sender::duration] on the shared sender
pub fn duration(bucket: &str, duration: Duration) {
    with_sender(|sender| sender.duration(bucket, duration))
}

/// [Sender::new_timing] on the shared sender
pub fn new_timing() -> Option<Timing<'static>> {
    match get_sender() {
        Ok(sender) => Some(sender.new_timing()),
        Err(err) => {
            trace!(error = %err, "metrics sender unavailable, timing disabled");
            None
        }
    }
}
