//! # svcmon
//!
//! Runtime service monitoring. This crate declares the fixed set of
//! instruments a service runtime reports, registers one aggregation view per
//! instrument with an external metrics backend and exposes a typed recording
//! API that runtime components call on significant events:
//!
//! * Component lifecycle: loaded, initialized, initialization failures.
//! * mTLS: authenticator init and workload certificate rotation outcomes.
//! * Actors: placement status reports, table operations, rebalancing,
//!   deactivation, reminders and timers, and calls pending on the per-actor lock.
//! * Access control decisions for service invocation.
//! * Service invocation request/response flow, including response latency.
//!
//! The backend is abstracted behind [`Sink`]. [`MetricsRecorder`] starts
//! disabled and every recording method is a no-op until
//! [`MetricsRecorder::init`] registers the views.
//!
//! ```ignore
//! let recorder = Arc::new(MetricsRecorder::default());
//! recorder.init(sink, "checkout", &DEFAULT_LATENCY_BUCKETS_MS)?;
//!
//! recorder.component_initialized("statestore");
//! recorder.report_actor_pending_calls("cart", 1);
//! ```

pub mod config;
mod error;
mod identity;
#[cfg(any(test, feature = "test-util"))]
pub mod mock_sink;
mod pending;
mod recorder;
mod registry;
mod sink;
pub mod tags;
mod utils;
mod view;

pub use config::{MetricsConfig, MetricsConfigBuilder, DEFAULT_LATENCY_BUCKETS_MS};
pub use error::RegistrationError;
pub use identity::{CallerIdentity, Identity};
pub use recorder::MetricsRecorder;
pub use registry::{Instrument, InstrumentKind, MeasurementRegistry, Unit};
pub use sink::Sink;
pub use tags::{Tag, TagKey};
pub use utils::elapsed_since;
pub use view::{Aggregation, Measurement, MeasurementValue, View};
