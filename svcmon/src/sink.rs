use crate::error::RegistrationError;
use crate::tags::Tag;
use crate::view::{Measurement, View};

/// [`Sink`] the metrics backend views are registered with and samples are
/// pushed to.
///
/// Implementations must tolerate concurrent `submit` calls and must not block
/// the caller on export. Buffering, aggregation and retries belong to the sink.
pub trait Sink: Send + Sync + 'static {
    /// Registers the whole batch of views. Either every view is accepted or
    /// an error is returned and none of them should be considered active.
    fn register_views(&self, views: &[View]) -> Result<(), RegistrationError>;

    /// Hands one sample off to the backend. Fire and forget.
    fn submit(&self, tags: &[Tag], measurement: Measurement);
}
