use crate::registry::Instrument;
use crate::tags::TagKey;

/// [`Aggregation`] how the sink folds samples of one view.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Number of samples.
    Count,
    /// Most recent sample.
    LastValue,
    /// Histogram over explicit, strictly increasing upper bounds.
    Distribution(Vec<f64>),
}

impl Aggregation {
    /// Bucket bounds for [`Aggregation::Distribution`], `None` otherwise.
    pub fn buckets(&self) -> Option<&[f64]> {
        match self {
            Aggregation::Distribution(bounds) => Some(bounds),
            _ => None,
        }
    }
}

/// [`View`] binds an instrument and its dimensions to an aggregation.
///
/// Views are built once during initialization and handed to the sink as a
/// single batch. After that the sink owns the binding.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub instrument: Instrument,
    pub tag_keys: &'static [TagKey],
    pub aggregation: Aggregation,
}

impl View {
    pub fn name(&self) -> &'static str {
        self.instrument.name()
    }
}

/// [`MeasurementValue`] the numeric payload of one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasurementValue {
    Int(i64),
    Float(f64),
}

impl MeasurementValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            MeasurementValue::Int(value) => value as f64,
            MeasurementValue::Float(value) => value,
        }
    }
}

impl From<i64> for MeasurementValue {
    fn from(value: i64) -> Self {
        MeasurementValue::Int(value)
    }
}

impl From<f64> for MeasurementValue {
    fn from(value: f64) -> Self {
        MeasurementValue::Float(value)
    }
}

/// [`Measurement`] one sample for a named instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub name: &'static str,
    pub value: MeasurementValue,
}
