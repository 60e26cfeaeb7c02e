//! # Recorder
//!
//! [metrics::Recorder] forwarding the `metrics` macros to a [Sender]
//!
//! * Counters are sent as statsd counts, absolute counters as gauges
//! * Gauges keep their current value so increments can be sent as absolute values
//! * Histograms are sent as timers, values are read as milliseconds
//! * Label values are appended to the metric name: `requests{method=GET}` is sent as `requests.GET`

use super::error::ConfigError;
use super::sender::Sender;
use metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, SharedString, Unit};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// Statsd bucket for a metrics key
fn bucket(key: &Key) -> String {
    let mut bucket = key.name().to_string();
    for label in key.labels() {
        bucket.push('.');
        bucket.push_str(label.value());
    }
    bucket
}

struct CounterHandle {
    sender: Arc<Sender>,
    bucket: String,
}

impl metrics::CounterFn for CounterHandle {
    fn increment(&self, value: u64) {
        self.sender.count(&self.bucket, i64::try_from(value).unwrap_or(i64::MAX));
    }

    // statsd has no absolute counter
    fn absolute(&self, value: u64) {
        self.sender.gauge(&self.bucket, value as f64);
    }
}

struct GaugeHandle {
    sender: Arc<Sender>,
    bucket: String,
    /// f64 bits
    value: AtomicU64,
}

impl GaugeHandle {
    fn update(&self, f: impl Fn(f64) -> f64) {
        let previous = self
            .value
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some(f(f64::from_bits(bits)).to_bits())
            })
            .unwrap_or_else(|bits| bits);
        self.sender.gauge(&self.bucket, f(f64::from_bits(previous)));
    }
}

impl metrics::GaugeFn for GaugeHandle {
    fn increment(&self, value: f64) {
        self.update(|current| current + value)
    }

    fn decrement(&self, value: f64) {
        self.update(|current| current - value)
    }

    fn set(&self, value: f64) {
        self.value.store(value.to_bits(), Ordering::Relaxed);
        self.sender.gauge(&self.bucket, value);
    }
}

struct HistogramHandle {
    sender: Arc<Sender>,
    bucket: String,
}

impl metrics::HistogramFn for HistogramHandle {
    fn record(&self, value: f64) {
        // Saturating cast, negative values become 0
        self.sender.timing(&self.bucket, value as u64);
    }
}

/// Forwards `metrics` counters, gauges and histograms to every destination of a [Sender]
///
/// Use [Builder::install](super::Builder::install) to build and install in one go.
pub struct StatsdRecorder {
    sender: Arc<Sender>,
    /// Gauges outlive the handles the macros drop
    gauges: Mutex<HashMap<Key, Arc<GaugeHandle>>>,
}

impl StatsdRecorder {
    pub fn new(sender: Arc<Sender>) -> Self {
        Self {
            sender,
            gauges: Mutex::new(HashMap::new()),
        }
    }

    pub fn sender(&self) -> &Arc<Sender> {
        &self.sender
    }

    /// Install as the process-wide [metrics] recorder
    pub fn install(self) -> Result<(), ConfigError> {
        metrics::set_global_recorder(self).map_err(|_| ConfigError::RecorderAlreadyInstalled)
    }
}

impl metrics::Recorder for StatsdRecorder {
    fn describe_counter(&self, key: KeyName, unit: Option<Unit>, _description: SharedString) {
        trace!(key = key.as_str(), ?unit, "statsd ignores counter descriptions");
    }

    fn describe_gauge(&self, key: KeyName, unit: Option<Unit>, _description: SharedString) {
        trace!(key = key.as_str(), ?unit, "statsd ignores gauge descriptions");
    }

    fn describe_histogram(&self, key: KeyName, unit: Option<Unit>, _description: SharedString) {
        trace!(key = key.as_str(), ?unit, "statsd ignores histogram descriptions");
    }

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(CounterHandle {
            sender: self.sender.clone(),
            bucket: bucket(key),
        }))
    }

    #[allow(clippy::mutable_key_type)] // metrics::Key has interior mutability
    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        let mut gauges = self.gauges.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = gauges.entry(key.clone()).or_insert_with(|| {
            Arc::new(GaugeHandle {
                sender: self.sender.clone(),
                bucket: bucket(key),
                value: AtomicU64::new(0f64.to_bits()),
            })
        });
        Gauge::from_arc(handle.clone())
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(HistogramHandle {
            sender: self.sender.clone(),
            bucket: bucket(key),
        }))
    }
}
