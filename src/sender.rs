//! # Sender
//!
//! Fans every metric out to all configured statsd clients

use super::builder::Builder;
use super::client::MetricClient;
use super::error::ConfigError;
use super::timing::{Clock, SystemClock, Timing};
use std::fmt;
use std::time::Duration;

/// Values accepted by [Sender::gauge]
///
/// Integers wider than 52 bits lose precision, statsd gauges are floating point.
pub trait ToGaugeValue {
    fn to_gauge_value(self) -> f64;
}

macro_rules! impl_to_gauge_value {
    ($($ty:ty),*) => {
        $(
            impl ToGaugeValue for $ty {
                fn to_gauge_value(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_to_gauge_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Owns one client per destination, in configuration order
///
/// Use [Builder] or [Sender::from_env] to construct. A built sender always has at
/// least one client.
///
/// # Example
/// ```no_run
/// # fn main() -> Result<(), statsd_fanout::ConfigError> {
/// let metrics = statsd_fanout::Sender::from_env()?;
///
/// metrics.count("my_counter", 3);
/// metrics.increment("my_counter");
/// metrics.gauge("queue.depth", 17);
/// metrics.duration("request", std::time::Duration::from_millis(12));
/// # Ok(())
/// # }
/// ```
pub struct Sender {
    clients: Vec<Box<dyn MetricClient>>,
}

impl Sender {
    pub(crate) fn new(clients: Vec<Box<dyn MetricClient>>) -> Self {
        Self { clients }
    }

    /// Build from `METRICS_HOST` / `METRICS_PORT` / `METRICS_PREFIX` and `METRICS_DESTINATIONS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Builder::new().with_env().build()
    }

    pub fn clients(&self) -> &[Box<dyn MetricClient>] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Add `n` to the counter `bucket`
    pub fn count(&self, bucket: &str, n: i64) {
        for client in &self.clients {
            client.count(bucket, n);
        }
    }

    /// Add one to the counter `bucket`
    pub fn increment(&self, bucket: &str) {
        self.count(bucket, 1);
    }

    /// Set the gauge `bucket` to `value`
    pub fn gauge(&self, bucket: &str, value: impl ToGaugeValue) {
        let value = value.to_gauge_value();
        for client in &self.clients {
            client.gauge(bucket, value);
        }
    }

    /// Send `duration` as a timer, truncated to whole milliseconds
    ///
    /// Useful when the start of the measurement isn't now, otherwise see [Sender::new_timing].
    pub fn duration(&self, bucket: &str, duration: Duration) {
        self.timing(bucket, u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
    }

    /// Send a timer already expressed in milliseconds
    pub fn timing(&self, bucket: &str, ms: u64) {
        for client in &self.clients {
            client.timing(bucket, ms);
        }
    }

    /// Start a [Timing] on the system clock
    pub fn new_timing(&self) -> Timing<'_> {
        Timing::new(self, SystemClock)
    }

    /// Start a [Timing] on the given clock
    pub fn new_timing_with<C: Clock>(&self, clock: C) -> Timing<'_, C> {
        Timing::new(self, clock)
    }
}

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender").field("clients", &self.clients.len()).finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// What a [RecordingClient] saw: client index and the statsd line without prefix
    #[derive(Debug, PartialEq)]
    pub(crate) struct Recorded {
        pub client: usize,
        pub line: String,
    }

    impl Recorded {
        pub fn count(client: usize, bucket: &str, n: i64) -> Self {
            Self {
                client,
                line: format!("{bucket}:{n}|c"),
            }
        }

        pub fn gauge(client: usize, bucket: &str, value: f64) -> Self {
            Self {
                client,
                line: format!("{bucket}:{value}|g"),
            }
        }

        pub fn timing(client: usize, bucket: &str, ms: u64) -> Self {
            Self {
                client,
                line: format!("{bucket}:{ms}|ms"),
            }
        }
    }

    pub(crate) type Log = Arc<Mutex<Vec<Recorded>>>;

    pub(crate) struct RecordingClient {
        index: usize,
        log: Log,
    }

    impl RecordingClient {
        pub fn new(index: usize, log: Log) -> Self {
            Self { index, log }
        }
    }

    impl MetricClient for RecordingClient {
        fn count(&self, bucket: &str, n: i64) {
            self.log.lock().unwrap().push(Recorded::count(self.index, bucket, n));
        }

        fn gauge(&self, bucket: &str, value: f64) {
            self.log.lock().unwrap().push(Recorded::gauge(self.index, bucket, value));
        }

        fn timing(&self, bucket: &str, ms: u64) {
            self.log.lock().unwrap().push(Recorded::timing(self.index, bucket, ms));
        }
    }

    /// A sender over `clients` recording clients sharing one log
    pub(crate) fn recording_sender(clients: usize) -> (Sender, Log) {
        let log = Log::default();
        let clients = (0..clients)
            .map(|index| Box::new(RecordingClient::new(index, log.clone())) as Box<dyn MetricClient>)
            .collect();
        (Sender::new(clients), log)
    }

    #[test]
    fn count_fans_out_in_order() {
        let (sender, log) = recording_sender(3);

        sender.count("test.count", 3);

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Recorded::count(0, "test.count", 3),
                Recorded::count(1, "test.count", 3),
                Recorded::count(2, "test.count", 3),
            ]
        );
    }

    #[test]
    fn increment_is_count_of_one() {
        let (sender, log) = recording_sender(1);

        sender.increment("test.increment");
        sender.count("test.increment", 1);

        let log = log.lock().unwrap();
        assert_eq!(log[0], Recorded::count(0, "test.increment", 1));
        assert_eq!(log[0], log[1]);
    }

    #[test]
    fn gauge_accepts_integers_and_floats() {
        let (sender, log) = recording_sender(1);

        sender.gauge("test.gauge", 123);
        sender.gauge("test.gauge", 1.5);

        assert_eq!(
            *log.lock().unwrap(),
            vec![Recorded::gauge(0, "test.gauge", 123.0), Recorded::gauge(0, "test.gauge", 1.5)]
        );
    }

    #[test]
    fn gauge_accepts_wide_integers() {
        let (sender, log) = recording_sender(1);

        sender.gauge("queue.depth", 12_u64);
        sender.gauge("queue.depth", 7_usize);
        sender.gauge("balance", -3_i64);

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Recorded::gauge(0, "queue.depth", 12.0),
                Recorded::gauge(0, "queue.depth", 7.0),
                Recorded::gauge(0, "balance", -3.0),
            ]
        );
    }

    #[test]
    fn duration_truncates_to_millis() {
        let (sender, log) = recording_sender(2);

        sender.duration("test.duration", Duration::from_micros(123_456));
        sender.duration("test.duration", Duration::from_micros(999));

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                Recorded::timing(0, "test.duration", 123),
                Recorded::timing(1, "test.duration", 123),
                Recorded::timing(0, "test.duration", 0),
                Recorded::timing(1, "test.duration", 0),
            ]
        );
    }

    #[test]
    fn debug_shows_client_count() {
        let (sender, _) = recording_sender(2);
        assert_eq!(format!("{sender:?}"), "Sender { clients: 2 }");
    }
}
