//! Histogram metrics

/// Time from dial to authenticated connection
pub fn connect_duration(duration_ms: u64) {
    metrics::histogram!("cursusdb_connect_duration_ms").record(duration_ms as f64);
}

/// Time for one query exchange
pub fn query_duration(duration_ms: u64) {
    metrics::histogram!("cursusdb_query_duration_ms").record(duration_ms as f64);
}
