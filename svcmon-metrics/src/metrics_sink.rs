use std::collections::HashMap;
use std::sync::Arc;

use metrics::{describe_counter, describe_gauge, describe_histogram, Label, Recorder};
use parking_lot::RwLock;
use svcmon::{Aggregation, InstrumentKind, Measurement, MeasurementValue, RegistrationError, Sink, Tag, Unit, View};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Counter,
    Gauge,
    Histogram,
}

/// [`MetricsSink`] forwards samples to a `metrics` recorder.
///
/// Count views become counters, last-value views become gauges and the
/// distribution view becomes a histogram. Histogram bucket bounds are not part
/// of the `metrics` data model, so they are kept here and exposed through
/// [`buckets_for`](Self::buckets_for) for exporter setup.
pub struct MetricsSink {
    // `None` routes through the globally installed recorder.
    recorder: Option<Arc<dyn Recorder + Send + Sync>>,
    views: RwLock<HashMap<&'static str, (Target, Option<Vec<f64>>)>>,
}

impl MetricsSink {
    /// Creates a sink that reports to the global `metrics` recorder.
    pub fn new() -> Self {
        Self { recorder: None, views: RwLock::new(HashMap::new()) }
    }

    /// Creates a sink that reports to `recorder` instead of the global one.
    pub fn with_recorder(recorder: Arc<dyn Recorder + Send + Sync>) -> Self {
        Self { recorder: Some(recorder), views: RwLock::new(HashMap::new()) }
    }

    /// Bucket bounds registered for a distribution view.
    pub fn buckets_for(&self, name: &str) -> Option<Vec<f64>> {
        self.views.read().get(name).and_then(|(_, buckets)| buckets.clone())
    }

    /// Names of every registered view.
    pub fn view_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.views.read().keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn with_target<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.recorder {
            Some(recorder) => metrics::with_local_recorder(recorder.as_ref(), f),
            None => f(),
        }
    }

    fn validate(
        registered: &HashMap<&'static str, (Target, Option<Vec<f64>>)>,
        views: &[View],
    ) -> Result<Vec<(&'static str, Target)>, RegistrationError> {
        let mut accepted: Vec<(&'static str, Target)> = Vec::with_capacity(views.len());

        for view in views {
            let name = view.name();
            if registered.contains_key(name) || accepted.iter().any(|(n, _)| *n == name) {
                return Err(RegistrationError::DuplicateView { name: name.to_string() });
            }

            let target = match (view.instrument.kind(), &view.aggregation) {
                (InstrumentKind::Counter, Aggregation::Count) => Target::Counter,
                (InstrumentKind::Gauge, Aggregation::LastValue) => Target::Gauge,
                (InstrumentKind::Histogram, Aggregation::Distribution(buckets)) => {
                    validate_buckets(name, buckets)?;
                    Target::Histogram
                }
                (kind, aggregation) => {
                    return Err(RegistrationError::InvalidAggregation {
                        name: name.to_string(),
                        reason: format!("{:?} cannot be aggregated as {:?}", kind, aggregation),
                    })
                }
            };
            accepted.push((name, target));
        }

        Ok(accepted)
    }
}

impl Default for MetricsSink {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_buckets(name: &str, buckets: &[f64]) -> Result<(), RegistrationError> {
    let invalid = |reason: &str| RegistrationError::InvalidAggregation {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if buckets.is_empty() {
        return Err(invalid("no bucket bounds"));
    }
    if buckets.iter().any(|bound| !bound.is_finite()) {
        return Err(invalid("bucket bounds must be finite"));
    }
    if buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(invalid("bucket bounds must be strictly increasing"));
    }
    Ok(())
}

fn metrics_unit(unit: Unit) -> metrics::Unit {
    match unit {
        Unit::Dimensionless => metrics::Unit::Count,
        Unit::Milliseconds => metrics::Unit::Milliseconds,
    }
}

impl Sink for MetricsSink {
    fn register_views(&self, views: &[View]) -> Result<(), RegistrationError> {
        let mut registered = self.views.write();
        // Nothing is described until the whole batch is known to be valid.
        let accepted = Self::validate(&registered, views)?;

        self.with_target(|| {
            for view in views {
                let instrument = &view.instrument;
                let unit = metrics_unit(instrument.unit());
                match instrument.kind() {
                    InstrumentKind::Counter => describe_counter!(instrument.name(), unit, instrument.description()),
                    InstrumentKind::Gauge => describe_gauge!(instrument.name(), unit, instrument.description()),
                    InstrumentKind::Histogram => describe_histogram!(instrument.name(), unit, instrument.description()),
                }
            }
        });

        for (view, (name, target)) in views.iter().zip(accepted) {
            let buckets = view.aggregation.buckets().map(<[f64]>::to_vec);
            registered.insert(name, (target, buckets));
        }
        debug!("[SVCMON] Described {} views on the metrics recorder", views.len());
        Ok(())
    }

    fn submit(&self, tags: &[Tag], measurement: Measurement) {
        let target = match self.views.read().get(measurement.name) {
            Some((target, _)) => *target,
            None => {
                debug!("[SVCMON] Dropping sample for unregistered view `{}`", measurement.name);
                return;
            }
        };

        let labels: Vec<Label> = tags
            .iter()
            .map(|tag| Label::new(tag.key.name(), tag.value.clone()))
            .collect();
        let name = measurement.name;

        self.with_target(|| match (target, measurement.value) {
            (Target::Counter, MeasurementValue::Int(value)) => {
                metrics::counter!(name, labels).increment(value.max(0) as u64)
            }
            (Target::Counter, MeasurementValue::Float(value)) => {
                metrics::counter!(name, labels).increment(value.max(0.0) as u64)
            }
            (Target::Gauge, value) => metrics::gauge!(name, labels).set(value.as_f64()),
            (Target::Histogram, value) => metrics::histogram!(name, labels).record(value.as_f64()),
        });
    }
}
