//! Lightweight in-process client metrics.
//!
//! Metrics are stored as atomics and rendered on demand in Prometheus text
//! format; wiring them to an HTTP endpoint is up to the embedding process.

pub mod metrics;

pub use metrics::ClientMetrics;
