use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_int_counter, CounterVec, IntCounter};

pub static RENDERS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!("renders_total", "Responses rendered by renderer", &["renderer"]).unwrap()
});

pub static STATIC_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "static_requests_total",
        "Request classifications by result",
        &["result"]
    )
    .unwrap()
});

pub static STATIC_CONFIG_LOADS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "static_config_loads_total",
        "Static resource definition loads"
    )
    .unwrap()
});

pub fn gather_text() -> String {
    use prometheus::{Encoder, TextEncoder};
    let encoder = TextEncoder::new();
    let mut buf = Vec::new();
    let _ = encoder.encode(&prometheus::gather(), &mut buf);
    String::from_utf8(buf).unwrap_or_default()
}
