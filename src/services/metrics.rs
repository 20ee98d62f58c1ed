use once_cell::sync::OnceCell;
use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, TextEncoder, register_histogram_vec,
    register_int_counter, register_int_counter_vec, register_int_gauge,
};
use std::time::Instant;

pub static COMMANDS: OnceCell<IntCounterVec> = OnceCell::new();
pub static COMMAND_LATENCY: OnceCell<HistogramVec> = OnceCell::new();
pub static PERSIST_ERRORS: OnceCell<IntCounter> = OnceCell::new();
pub static ACTIVE_CONNECTIONS: OnceCell<IntGauge> = OnceCell::new();
pub static BLACKLIST_SIZE: OnceCell<IntGauge> = OnceCell::new();

/// Registers every metric with the default registry. Safe to call more than once.
pub fn init_metrics() {
    COMMANDS.get_or_init(|| {
        register_int_counter_vec!(
            "bloomlist_commands_total",
            "Commands handled, by verb and response status",
            &["verb", "status"]
        )
        .unwrap()
    });
    COMMAND_LATENCY.get_or_init(|| {
        register_histogram_vec!(
            "bloomlist_command_latency_seconds",
            "Command handling latency in seconds",
            &["verb"],
            vec![0.00001, 0.0001, 0.001, 0.01, 0.1]
        )
        .unwrap()
    });
    PERSIST_ERRORS.get_or_init(|| {
        register_int_counter!(
            "bloomlist_persist_errors_total",
            "Snapshots that could not be written"
        )
        .unwrap()
    });
    ACTIVE_CONNECTIONS.get_or_init(|| {
        register_int_gauge!("bloomlist_active_connections", "Open client connections").unwrap()
    });
    BLACKLIST_SIZE.get_or_init(|| {
        register_int_gauge!("bloomlist_blacklist_size", "Items in the exact blacklist").unwrap()
    });
}

pub fn record_command(verb: &str, status: u16, start: Instant) {
    if let Some(commands) = COMMANDS.get() {
        let mut buf = itoa::Buffer::new();
        commands.with_label_values(&[verb, buf.format(status)]).inc();
    }
    if let Some(latency) = COMMAND_LATENCY.get() {
        latency
            .with_label_values(&[verb])
            .observe(start.elapsed().as_secs_f64());
    }
}

pub fn record_persist_error() {
    if let Some(errors) = PERSIST_ERRORS.get() {
        errors.inc();
    }
}

pub fn connection_opened() {
    if let Some(gauge) = ACTIVE_CONNECTIONS.get() {
        gauge.inc();
    }
}

pub fn connection_closed() {
    if let Some(gauge) = ACTIVE_CONNECTIONS.get() {
        gauge.dec();
    }
}

pub fn set_blacklist_size(size: usize) {
    if let Some(gauge) = BLACKLIST_SIZE.get() {
        gauge.set(size as i64);
    }
}

/// Text exposition of the default registry.
pub fn render() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&prometheus::gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
