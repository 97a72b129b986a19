//! Metrics emitted through the [`metrics`] facade
//!
//! Nothing is recorded unless the application installs a recorder (for
//! example a Prometheus exporter). Metric names:
//!
//! * `cursusdb_connections_total{result}`: connection attempts by outcome
//! * `cursusdb_auth_total{result}`: authentication exchanges by outcome
//! * `cursusdb_queries_total{status}`: query exchanges by outcome
//! * `cursusdb_connect_duration_ms`: time to an authenticated connection
//! * `cursusdb_query_duration_ms`: time for one query exchange

pub mod counters;
pub mod histograms;
pub mod labels;
