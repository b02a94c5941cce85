use thiserror::Error;

/// [`RegistrationError`] returned when the sink refuses the view batch during
/// [`MetricsRecorder::init`](crate::MetricsRecorder::init).
///
/// This is the only failure the crate reports. Recording calls never fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A view with the same metric name is already registered with the sink.
    #[error("view `{name}` is already registered")]
    DuplicateView { name: String },

    /// The aggregation of a view is not usable, e.g. empty or unsorted buckets.
    #[error("invalid aggregation for view `{name}`: {reason}")]
    InvalidAggregation { name: String, reason: String },

    /// The sink rejected a view for a backend specific reason.
    #[error("sink rejected view `{name}`: {reason}")]
    Rejected { name: String, reason: String },

    /// `init` was already completed on this recorder.
    #[error("metrics recorder is already initialized")]
    AlreadyInitialized,
}
