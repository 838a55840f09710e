//! Connection pool metrics
//!
//! Recorded through the `metrics` facade; they are no-ops until the host
//! process installs a recorder (e.g. a Prometheus exporter).

use crate::error::ErrorKind;
use std::time::Duration;

/// Record a completed pool creation
pub fn record_pool_created(host: &str, channels: usize, duration: Duration) {
    metrics::counter!("search_rpc_channels_opened_total", "host" => host.to_string())
        .increment(channels as u64);
    metrics::histogram!("search_rpc_pool_create_duration_seconds", "host" => host.to_string())
        .record(duration.as_secs_f64());
}

/// Record a pool creation that was abandoned
pub fn record_pool_create_failed(host: &str, kind: ErrorKind) {
    metrics::counter!(
        "search_rpc_pool_create_failures_total",
        "host" => host.to_string(),
        "error_type" => error_type(kind),
    )
    .increment(1);
}

/// Record the number of live pools
pub fn record_pool_count(pools: usize) {
    metrics::gauge!("search_rpc_pools").set(pools as f64);
}

/// Record one channel checkout
pub fn record_checkout(host: &str) {
    metrics::counter!("search_rpc_checkouts_total", "host" => host.to_string()).increment(1);
}

fn error_type(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidKey => "invalid_key",
        ErrorKind::IdentityResolution => "identity",
        ErrorKind::CertificateTrust => "certificate",
        ErrorKind::Dial => "dial",
    }
}
