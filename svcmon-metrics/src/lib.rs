//! # svcmon-metrics
//!
//! [`Sink`](svcmon::Sink) implementation backed by the `metrics` facade. Any
//! exporter installed as the `metrics` recorder (Prometheus, StatsD, ...)
//! receives the runtime's instruments under their stable names.

mod metrics_sink;

pub use metrics_sink::MetricsSink;
