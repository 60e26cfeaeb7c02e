use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .compact()
        .init();

    // METRICS_HOST / METRICS_PORT / METRICS_PREFIX and/or METRICS_DESTINATIONS
    let metrics = match statsd_fanout::Builder::new().with_env().install() {
        Ok(metrics) => metrics,
        Err(err) => {
            tracing::error!(error = %err, "unable to configure metrics");
            return ExitCode::FAILURE;
        }
    };

    metrics.count("example.counter", 3);
    metrics.increment("example.counter");
    metrics.gauge("example.gauge", 42);

    let timing = metrics.new_timing();
    std::thread::sleep(Duration::from_millis(100));
    timing.send("example.task.timing");

    metrics::counter!("example.requests", "method" => "GET").increment(1);
    metrics::histogram!("example.latency").record(12.0);

    ExitCode::SUCCESS
}
