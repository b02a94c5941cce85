use parking_lot::Mutex;

use crate::error::RegistrationError;
use crate::sink::Sink;
use crate::tags::Tag;
use crate::view::{Measurement, View};

/// [`Sample`] one submission captured by [`MockSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub tags: Vec<Tag>,
    pub measurement: Measurement,
}

impl Sample {
    /// Value of the tag named `key`, if present.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.key.name() == key)
            .map(|tag| tag.value.as_str())
    }
}

/// [`MockSink`] in-memory sink that captures registrations and samples.
#[derive(Default)]
pub struct MockSink {
    views: Mutex<Vec<View>>,
    samples: Mutex<Vec<Sample>>,
    register_calls: Mutex<usize>,
    next_error: Mutex<Option<RegistrationError>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `register_views` call fail with `error`.
    pub fn reject_next(&self, error: RegistrationError) {
        *self.next_error.lock() = Some(error);
    }

    pub fn views(&self) -> Vec<View> {
        self.views.lock().clone()
    }

    pub fn register_calls(&self) -> usize {
        *self.register_calls.lock()
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().clone()
    }

    pub fn samples_for(&self, name: &str) -> Vec<Sample> {
        self.samples
            .lock()
            .iter()
            .filter(|sample| sample.measurement.name == name)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.samples.lock().clear();
    }
}

impl Sink for MockSink {
    fn register_views(&self, views: &[View]) -> Result<(), RegistrationError> {
        *self.register_calls.lock() += 1;
        if let Some(error) = self.next_error.lock().take() {
            return Err(error);
        }

        let mut registered = self.views.lock();
        if let Some(duplicate) = views
            .iter()
            .find(|view| registered.iter().any(|existing| existing.name() == view.name()))
        {
            return Err(RegistrationError::DuplicateView { name: duplicate.name().to_string() });
        }
        registered.extend_from_slice(views);
        Ok(())
    }

    fn submit(&self, tags: &[Tag], measurement: Measurement) {
        self.samples.lock().push(Sample { tags: tags.to_vec(), measurement });
    }
}
