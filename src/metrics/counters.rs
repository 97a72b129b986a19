//! Counter metrics

use super::labels;

/// A connection attempt passed validation and is dialing
pub fn connection_attempted() {
    metrics::counter!("cursusdb_connections_total", labels::RESULT => labels::RESULT_ATTEMPTED)
        .increment(1);
}

/// A connection was opened and authenticated
pub fn connection_established() {
    metrics::counter!("cursusdb_connections_total", labels::RESULT => labels::RESULT_SUCCESS)
        .increment(1);
}

/// A connection attempt failed
pub fn connection_failed(error_kind: &'static str) {
    metrics::counter!(
        "cursusdb_connections_total",
        labels::RESULT => labels::RESULT_FAILURE,
        labels::ERROR_KIND => error_kind
    )
    .increment(1);
}

/// The cluster accepted the credentials
pub fn auth_successful() {
    metrics::counter!("cursusdb_auth_total", labels::RESULT => labels::RESULT_SUCCESS).increment(1);
}

/// The authentication exchange failed
pub fn auth_failed() {
    metrics::counter!("cursusdb_auth_total", labels::RESULT => labels::RESULT_FAILURE).increment(1);
}

/// A query exchange finished with `status`
pub fn query_completed(status: &'static str) {
    metrics::counter!("cursusdb_queries_total", labels::STATUS => status).increment(1);
}
