use std::sync::{Arc, OnceLock};
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::config::MetricsConfig;
use crate::error::RegistrationError;
use crate::identity::Identity;
use crate::pending::PendingActorCalls;
use crate::registry::{Instrument, MeasurementRegistry};
use crate::sink::Sink;
use crate::tags::{zip_tags, TYPE_STREAMING, TYPE_UNARY};
use crate::utils::elapsed_since;
use crate::view::MeasurementValue;

/// State that only exists once `init` succeeded.
struct Active {
    app_id: String,
    sink: Arc<dyn Sink>,
}

impl Active {
    fn record(&self, instrument: &Instrument, values: &[&str], value: impl Into<MeasurementValue>) {
        let tags = zip_tags(instrument.tag_keys(), values);
        self.sink.submit(&tags, instrument.measure(value));
    }

    fn increment(&self, instrument: &Instrument, values: &[&str]) {
        self.record(instrument, values, 1_i64);
    }
}

/// [`MetricsRecorder`] typed recording API for runtime events.
///
/// A recorder starts disabled. Until [`init`](Self::init) succeeds every
/// recording method returns without building tags or touching the sink. Once
/// enabled it stays enabled for the lifetime of the value.
///
/// The recorder is meant to be created once during bootstrap and shared by
/// reference (usually behind an `Arc`) with every component that reports
/// telemetry. All methods take `&self` and are safe to call concurrently.
pub struct MetricsRecorder {
    registry: MeasurementRegistry,
    active: OnceLock<Active>,
    init_lock: Mutex<()>,
    pending_actor_calls: PendingActorCalls,
}

impl MetricsRecorder {
    pub fn new(registry: MeasurementRegistry) -> Self {
        Self {
            registry,
            active: OnceLock::new(),
            init_lock: Mutex::new(()),
            pending_actor_calls: PendingActorCalls::new(),
        }
    }

    pub fn registry(&self) -> &MeasurementRegistry {
        &self.registry
    }

    pub fn is_enabled(&self) -> bool {
        self.active.get().is_some()
    }

    /// Identity tag configured by `init`, `None` while disabled.
    pub fn app_id(&self) -> Option<&str> {
        self.active.get().map(|active| active.app_id.as_str())
    }

    /// Current pending-call total for `actor_type`, `None` if nothing was
    /// ever reported for it.
    pub fn pending_actor_calls(&self, actor_type: &str) -> Option<i32> {
        self.pending_actor_calls.get(actor_type)
    }

    /// Registers one view per instrument with `sink` and enables recording.
    ///
    /// All views are registered in a single batch. If the sink rejects the
    /// batch the error is returned as is and the recorder stays disabled.
    /// A second call is rejected with [`RegistrationError::AlreadyInitialized`]
    /// without reaching the sink.
    pub fn init(
        &self,
        sink: Arc<dyn Sink>,
        app_id: impl Into<String>,
        latency_buckets: &[f64],
    ) -> Result<(), RegistrationError> {
        let _guard = self.init_lock.lock();
        if self.active.get().is_some() {
            warn!("[SVCMON] Metrics recorder initialized more than once");
            return Err(RegistrationError::AlreadyInitialized);
        }

        let app_id = app_id.into();
        let views = self.registry.views(latency_buckets);
        if let Err(e) = sink.register_views(&views) {
            error!("[SVCMON] Failed to register metric views for `{}`: {}", app_id, e);
            return Err(e);
        }

        info!("[SVCMON] Registered {} metric views for `{}`", views.len(), app_id);
        // Cannot fail: the init lock is held and `active` was empty above.
        let _ = self.active.set(Active { app_id, sink });
        Ok(())
    }

    /// Initializes the recorder from `config`. Returns `Ok(false)` and leaves
    /// the recorder disabled when metrics are switched off.
    pub fn init_with_config(
        &self,
        sink: Arc<dyn Sink>,
        config: &MetricsConfig,
    ) -> Result<bool, RegistrationError> {
        if !config.enabled() {
            info!("[SVCMON] Metrics disabled for `{}`", config.app_id());
            return Ok(false);
        }
        self.init(sink, config.app_id(), config.latency_buckets())?;
        Ok(true)
    }

    // Component lifecycle

    /// Records a successfully loaded component.
    pub fn component_loaded(&self) {
        if let Some(active) = self.active.get() {
            active.increment(&self.registry.component_loaded, &[active.app_id.as_str()]);
        }
    }

    /// Records a successfully initialized component.
    pub fn component_initialized(&self, component: &str) {
        if let Some(active) = self.active.get() {
            active.increment(&self.registry.component_init_completed, &[active.app_id.as_str(), component]);
        }
    }

    /// Records a component initialization failure.
    pub fn component_init_failed(&self, component: &str, reason: &str, name: &str) {
        if let Some(active) = self.active.get() {
            active.increment(
                &self.registry.component_init_failed,
                &[active.app_id.as_str(), component, reason, name],
            );
        }
    }

    // mTLS

    pub fn mtls_init_completed(&self) {
        if let Some(active) = self.active.get() {
            active.increment(&self.registry.mtls_init_completed, &[active.app_id.as_str()]);
        }
    }

    pub fn mtls_init_failed(&self, reason: &str) {
        if let Some(active) = self.active.get() {
            active.increment(&self.registry.mtls_init_failed, &[active.app_id.as_str(), reason]);
        }
    }

    pub fn mtls_workload_cert_rotation_completed(&self) {
        if let Some(active) = self.active.get() {
            active.increment(&self.registry.mtls_workload_cert_rotated, &[active.app_id.as_str()]);
        }
    }

    pub fn mtls_workload_cert_rotation_failed(&self, reason: &str) {
        if let Some(active) = self.active.get() {
            active.increment(&self.registry.mtls_workload_cert_rotated_failed, &[active.app_id.as_str(), reason]);
        }
    }

    // Actors

    /// Records a status report sent to the placement service.
    pub fn actor_status_reported(&self, actor_type: &str, operation: &str) {
        if let Some(active) = self.active.get() {
            active.increment(
                &self.registry.actor_status_report_total,
                &[active.app_id.as_str(), actor_type, operation],
            );
        }
    }

    /// Records a failed status report to the placement service.
    pub fn actor_status_report_failed(&self, actor_type: &str, operation: &str, reason: &str) {
        if let Some(active) = self.active.get() {
            active.increment(
                &self.registry.actor_status_report_failed_total,
                &[active.app_id.as_str(), actor_type, operation, reason],
            );
        }
    }

    /// Records a placement table operation received by the runtime.
    pub fn actor_placement_table_operation_received(&self, actor_type: &str, operation: &str) {
        if let Some(active) = self.active.get() {
            active.increment(
                &self.registry.actor_table_operation_recv_total,
                &[active.app_id.as_str(), actor_type, operation],
            );
        }
    }

    /// Records actors being drained for rebalancing.
    pub fn actor_rebalanced(&self, actor_type: &str) {
        if let Some(active) = self.active.get() {
            active.increment(&self.registry.actor_rebalanced_total, &[active.app_id.as_str(), actor_type]);
        }
    }

    pub fn actor_deactivated(&self, actor_type: &str) {
        if let Some(active) = self.active.get() {
            active.increment(&self.registry.actor_deactivation_total, &[active.app_id.as_str(), actor_type]);
        }
    }

    pub fn actor_deactivation_failed(&self, actor_type: &str, reason: &str) {
        if let Some(active) = self.active.get() {
            active.increment(
                &self.registry.actor_deactivation_failed_total,
                &[active.app_id.as_str(), actor_type, reason],
            );
        }
    }

    pub fn actor_reminder_fired(&self, actor_type: &str, success: bool) {
        if let Some(active) = self.active.get() {
            active.increment(
                &self.registry.actor_reminder_fired_total,
                &[active.app_id.as_str(), actor_type, bool_str(success)],
            );
        }
    }

    pub fn actor_timer_fired(&self, actor_type: &str, success: bool) {
        if let Some(active) = self.active.get() {
            active.increment(
                &self.registry.actor_timer_fired_total,
                &[active.app_id.as_str(), actor_type, bool_str(success)],
            );
        }
    }

    /// Sets the current number of reminders registered for `actor_type`.
    pub fn actor_reminders(&self, actor_type: &str, reminders: i64) {
        if let Some(active) = self.active.get() {
            active.record(&self.registry.actor_reminders, &[active.app_id.as_str(), actor_type], reminders);
        }
    }

    /// Sets the current number of timers registered for `actor_type`.
    pub fn actor_timers(&self, actor_type: &str, timers: i64) {
        if let Some(active) = self.active.get() {
            active.record(&self.registry.actor_timers, &[active.app_id.as_str(), actor_type], timers);
        }
    }

    /// Applies `delta` to the number of calls waiting on the per-actor lock
    /// for `actor_type` and emits the resulting total.
    ///
    /// The gauge always carries the full running total, never the delta. The
    /// total is read back under the same lock that applied the delta. The lock
    /// is released before the sample is submitted.
    pub fn report_actor_pending_calls(&self, actor_type: &str, delta: i32) {
        if let Some(active) = self.active.get() {
            let pending = self.pending_actor_calls.apply(actor_type, delta);
            active.record(
                &self.registry.actor_pending_calls,
                &[active.app_id.as_str(), actor_type],
                i64::from(pending),
            );
        }
    }

    // Access control. These are tagged with the caller's app id, not ours.

    /// Records a request allowed by the app specific action of the access control policy.
    pub fn request_allowed_by_app_action(&self, caller: &dyn Identity) {
        self.record_policy_action(|r| &r.app_policy_action_allowed, caller);
    }

    /// Records a request blocked by the app specific action of the access control policy.
    pub fn request_blocked_by_app_action(&self, caller: &dyn Identity) {
        self.record_policy_action(|r| &r.app_policy_action_blocked, caller);
    }

    /// Records a request allowed by the global action of the access control policy.
    pub fn request_allowed_by_global_action(&self, caller: &dyn Identity) {
        self.record_policy_action(|r| &r.global_policy_action_allowed, caller);
    }

    /// Records a request blocked by the global action of the access control policy.
    pub fn request_blocked_by_global_action(&self, caller: &dyn Identity) {
        self.record_policy_action(|r| &r.global_policy_action_blocked, caller);
    }

    fn record_policy_action(
        &self,
        instrument: impl FnOnce(&MeasurementRegistry) -> &Instrument,
        caller: &dyn Identity,
    ) {
        if let Some(active) = self.active.get() {
            active.increment(
                instrument(&self.registry),
                &[caller.app_id(), caller.trust_domain(), caller.namespace()],
            );
        }
    }

    // Service invocation

    pub fn service_invocation_request_sent(&self, destination_app_id: &str) {
        if let Some(active) = self.active.get() {
            active.increment(
                &self.registry.service_invocation_request_sent_total,
                &[active.app_id.as_str(), destination_app_id, TYPE_UNARY],
            );
        }
    }

    pub fn service_invocation_streaming_request_sent(&self, destination_app_id: &str) {
        if let Some(active) = self.active.get() {
            active.increment(
                &self.registry.service_invocation_request_sent_total,
                &[active.app_id.as_str(), destination_app_id, TYPE_STREAMING],
            );
        }
    }

    pub fn service_invocation_request_received(&self, source_app_id: &str) {
        if let Some(active) = self.active.get() {
            active.increment(
                &self.registry.service_invocation_request_received_total,
                &[active.app_id.as_str(), source_app_id],
            );
        }
    }

    pub fn service_invocation_response_sent(&self, destination_app_id: &str, status: i32) {
        if let Some(active) = self.active.get() {
            let status = status.to_string();
            active.increment(
                &self.registry.service_invocation_response_sent_total,
                &[active.app_id.as_str(), destination_app_id, status.as_str()],
            );
        }
    }

    /// Records a unary response: one count on the totals instrument and one
    /// latency sample measured from `start`.
    pub fn service_invocation_response_received(&self, source_app_id: &str, status: i32, start: Instant) {
        if let Some(active) = self.active.get() {
            let status = status.to_string();
            active.increment(
                &self.registry.service_invocation_response_received_total,
                &[active.app_id.as_str(), source_app_id, status.as_str(), TYPE_UNARY],
            );
            active.record(
                &self.registry.service_invocation_response_received_latency,
                &[active.app_id.as_str(), source_app_id, status.as_str()],
                elapsed_since(start),
            );
        }
    }

    /// Records a streaming response. Mostly reached when proxying a streaming
    /// call fails, so no latency is recorded.
    pub fn service_invocation_streaming_response_received(&self, source_app_id: &str, status: i32) {
        if let Some(active) = self.active.get() {
            let status = status.to_string();
            active.increment(
                &self.registry.service_invocation_response_received_total,
                &[active.app_id.as_str(), source_app_id, status.as_str(), TYPE_STREAMING],
            );
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new(MeasurementRegistry::new())
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsConfigBuilder;
    use crate::identity::CallerIdentity;
    use crate::mock_sink::MockSink;
    use crate::tags::{APP_ID, COMPONENT, COMPONENT_NAME, FAIL_REASON};
    use crate::view::Aggregation;
    use std::time::Duration;

    const APP: &str = "checkout";

    fn enabled_recorder() -> (MetricsRecorder, Arc<MockSink>) {
        let sink = Arc::new(MockSink::new());
        let recorder = MetricsRecorder::default();
        recorder.init(sink.clone(), APP, &[1.0, 10.0, 100.0]).unwrap();
        (recorder, sink)
    }

    fn exercise_everything(recorder: &MetricsRecorder) {
        let caller = CallerIdentity::new("frontend", "public", "default");
        recorder.component_loaded();
        recorder.component_initialized("stateStore");
        recorder.component_init_failed("stateStore", "connection_refused", "redis-1");
        recorder.mtls_init_completed();
        recorder.mtls_init_failed("bad_cert");
        recorder.mtls_workload_cert_rotation_completed();
        recorder.mtls_workload_cert_rotation_failed("expired");
        recorder.actor_status_reported("cart", "update");
        recorder.actor_status_report_failed("cart", "update", "timeout");
        recorder.actor_placement_table_operation_received("cart", "lock");
        recorder.actor_rebalanced("cart");
        recorder.actor_deactivated("cart");
        recorder.actor_deactivation_failed("cart", "timeout");
        recorder.actor_reminder_fired("cart", true);
        recorder.actor_timer_fired("cart", false);
        recorder.actor_reminders("cart", 4);
        recorder.actor_timers("cart", 2);
        recorder.report_actor_pending_calls("cart", 1);
        recorder.request_allowed_by_app_action(&caller);
        recorder.request_blocked_by_app_action(&caller);
        recorder.request_allowed_by_global_action(&caller);
        recorder.request_blocked_by_global_action(&caller);
        recorder.service_invocation_request_sent("orders");
        recorder.service_invocation_streaming_request_sent("orders");
        recorder.service_invocation_request_received("frontend");
        recorder.service_invocation_response_sent("frontend", 200);
        recorder.service_invocation_response_received("orders", 200, Instant::now());
        recorder.service_invocation_streaming_response_received("orders", 500);
    }

    #[test]
    fn test_disabled_recorder_is_a_no_op() {
        let sink = Arc::new(MockSink::new());
        let recorder = MetricsRecorder::default();

        exercise_everything(&recorder);

        assert!(!recorder.is_enabled());
        assert_eq!(recorder.app_id(), None);
        assert_eq!(recorder.pending_actor_calls("cart"), None);
        assert!(sink.samples().is_empty());
        assert_eq!(sink.register_calls(), 0);
    }

    #[test]
    fn test_init_registers_one_view_per_instrument() {
        let (recorder, sink) = enabled_recorder();
        let views = sink.views();

        assert!(recorder.is_enabled());
        assert_eq!(recorder.app_id(), Some(APP));
        assert_eq!(sink.register_calls(), 1);
        assert_eq!(views.len(), recorder.registry().instruments().len());
        for (view, instrument) in views.iter().zip(recorder.registry().instruments()) {
            assert_eq!(view.instrument, *instrument);
            assert_eq!(view.tag_keys, instrument.tag_keys());
        }

        let latency = views
            .iter()
            .find(|view| view.name() == "runtime/service_invocation/res_recv_latency_ms")
            .unwrap();
        assert_eq!(latency.aggregation, Aggregation::Distribution(vec![1.0, 10.0, 100.0]));
    }

    #[test]
    fn test_failed_init_leaves_recorder_disabled() {
        let sink = Arc::new(MockSink::new());
        let recorder = MetricsRecorder::default();
        let rejection = RegistrationError::InvalidAggregation {
            name: "runtime/service_invocation/res_recv_latency_ms".to_string(),
            reason: "empty buckets".to_string(),
        };
        sink.reject_next(rejection.clone());

        assert_eq!(recorder.init(sink.clone(), APP, &[]), Err(rejection));
        assert!(!recorder.is_enabled());

        recorder.component_loaded();
        recorder.report_actor_pending_calls("cart", 1);
        assert!(sink.samples().is_empty());
        assert_eq!(recorder.pending_actor_calls("cart"), None);
    }

    #[test]
    fn test_second_init_is_rejected() {
        let (recorder, sink) = enabled_recorder();
        let other = Arc::new(MockSink::new());

        assert_eq!(
            recorder.init(other.clone(), "other", &[1.0]),
            Err(RegistrationError::AlreadyInitialized)
        );
        assert_eq!(other.register_calls(), 0);
        assert_eq!(sink.register_calls(), 1);
        assert_eq!(recorder.app_id(), Some(APP));
    }

    #[test]
    fn test_init_with_disabled_config() -> anyhow::Result<()> {
        let sink = Arc::new(MockSink::new());
        let recorder = MetricsRecorder::default();
        let config = MetricsConfigBuilder::new()
            .with_app_id(APP)
            .with_enabled(false)
            .build()?;

        assert_eq!(recorder.init_with_config(sink.clone(), &config), Ok(false));
        assert!(!recorder.is_enabled());
        assert_eq!(sink.register_calls(), 0);
        Ok(())
    }

    #[test]
    fn test_init_with_enabled_config() -> anyhow::Result<()> {
        let sink = Arc::new(MockSink::new());
        let recorder = MetricsRecorder::default();
        let config = MetricsConfigBuilder::new().with_app_id(APP).build()?;

        assert_eq!(recorder.init_with_config(sink.clone(), &config), Ok(true));
        assert_eq!(recorder.app_id(), Some(APP));
        Ok(())
    }

    #[test]
    fn test_component_init_failed_tags() {
        let (recorder, sink) = enabled_recorder();

        recorder.component_init_failed("stateStore", "connection_refused", "redis-1");

        let samples = sink.samples();
        assert_eq!(samples.len(), 1);
        let sample = &samples[0];
        assert_eq!(sample.measurement.name, "runtime/component/init_fail_total");
        assert_eq!(sample.measurement.value, MeasurementValue::Int(1));
        let keys: Vec<_> = sample.tags.iter().map(|tag| tag.key).collect();
        assert_eq!(keys, vec![APP_ID, COMPONENT, FAIL_REASON, COMPONENT_NAME]);
        assert_eq!(sample.tag("app_id"), Some(APP));
        assert_eq!(sample.tag("component"), Some("stateStore"));
        assert_eq!(sample.tag("reason"), Some("connection_refused"));
        assert_eq!(sample.tag("componentName"), Some("redis-1"));
    }

    #[test]
    fn test_every_sample_matches_its_view() {
        let (recorder, sink) = enabled_recorder();

        exercise_everything(&recorder);

        let views = sink.views();
        let samples = sink.samples();
        // Unary response received submits two samples.
        assert_eq!(samples.len(), 29);
        for sample in &samples {
            let view = views
                .iter()
                .find(|view| view.name() == sample.measurement.name)
                .unwrap();
            let keys: Vec<_> = sample.tags.iter().map(|tag| tag.key).collect();
            assert_eq!(keys, view.tag_keys, "{}", view.name());
        }
    }

    #[test]
    fn test_policy_actions_use_caller_identity() {
        let (recorder, sink) = enabled_recorder();
        let caller = CallerIdentity::new("frontend", "public", "prod");

        recorder.request_blocked_by_global_action(&caller);

        let samples = sink.samples_for("runtime/acl/global_policy_action_blocked_total");
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].tag("app_id"), Some("frontend"));
        assert_eq!(samples[0].tag("trustDomain"), Some("public"));
        assert_eq!(samples[0].tag("namespace"), Some("prod"));
    }

    #[test]
    fn test_fired_success_is_rendered_as_bool() {
        let (recorder, sink) = enabled_recorder();

        recorder.actor_reminder_fired("cart", true);
        recorder.actor_timer_fired("cart", false);

        let reminders = sink.samples_for("runtime/actor/reminders_fired_total");
        let timers = sink.samples_for("runtime/actor/timers_fired_total");
        assert_eq!(reminders[0].tag("success"), Some("true"));
        assert_eq!(timers[0].tag("success"), Some("false"));
    }

    #[test]
    fn test_gauges_carry_the_supplied_value() {
        let (recorder, sink) = enabled_recorder();

        recorder.actor_reminders("cart", 7);
        recorder.actor_timers("cart", 3);

        let reminders = sink.samples_for("runtime/actor/reminders");
        let timers = sink.samples_for("runtime/actor/timers");
        assert_eq!(reminders[0].measurement.value, MeasurementValue::Int(7));
        assert_eq!(timers[0].measurement.value, MeasurementValue::Int(3));
    }

    #[test]
    fn test_status_is_rendered_base_10() {
        let (recorder, sink) = enabled_recorder();

        recorder.service_invocation_response_sent("frontend", 200);
        recorder.service_invocation_response_sent("frontend", 0);
        recorder.service_invocation_response_sent("frontend", -1);

        let statuses: Vec<_> = sink
            .samples_for("runtime/service_invocation/res_sent_total")
            .iter()
            .map(|sample| sample.tag("status").unwrap().to_string())
            .collect();
        assert_eq!(statuses, vec!["200", "0", "-1"]);
    }

    #[test]
    fn test_request_sent_type() {
        let (recorder, sink) = enabled_recorder();

        recorder.service_invocation_request_sent("orders");
        recorder.service_invocation_streaming_request_sent("orders");

        let types: Vec<_> = sink
            .samples_for("runtime/service_invocation/req_sent_total")
            .iter()
            .map(|sample| sample.tag("type").unwrap().to_string())
            .collect();
        assert_eq!(types, vec!["unary", "streaming"]);
    }

    #[test]
    fn test_unary_response_received_records_count_and_latency() {
        let (recorder, sink) = enabled_recorder();
        let start = Instant::now() - Duration::from_millis(40);

        recorder.service_invocation_response_received("orders", 200, start);
        let upper = elapsed_since(start);

        let samples = sink.samples();
        assert_eq!(samples.len(), 2);

        let total = &samples[0];
        assert_eq!(total.measurement.name, "runtime/service_invocation/res_recv_total");
        assert_eq!(total.measurement.value, MeasurementValue::Int(1));
        assert_eq!(total.tag("type"), Some("unary"));
        assert_eq!(total.tag("status"), Some("200"));

        let latency = &samples[1];
        assert_eq!(latency.measurement.name, "runtime/service_invocation/res_recv_latency_ms");
        assert_eq!(latency.tag("src_app_id"), Some("orders"));
        assert_eq!(latency.tag("type"), None);
        match latency.measurement.value {
            MeasurementValue::Float(ms) => assert!((40.0..=upper).contains(&ms), "latency {ms}"),
            other => panic!("unexpected latency value {other:?}"),
        }
    }

    #[test]
    fn test_streaming_response_received_records_count_only() {
        let (recorder, sink) = enabled_recorder();

        recorder.service_invocation_streaming_response_received("orders", 14);

        let samples = sink.samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].measurement.name, "runtime/service_invocation/res_recv_total");
        assert_eq!(samples[0].tag("type"), Some("streaming"));
        assert_eq!(samples[0].tag("status"), Some("14"));
    }

    #[test]
    fn test_pending_calls_emit_running_total() {
        let (recorder, sink) = enabled_recorder();

        recorder.report_actor_pending_calls("actorX", 1);
        recorder.report_actor_pending_calls("actorX", 1);
        recorder.report_actor_pending_calls("actorX", 1);
        recorder.report_actor_pending_calls("actorX", -1);

        let values: Vec<_> = sink
            .samples_for("runtime/actor/pending_actor_calls")
            .iter()
            .map(|sample| sample.measurement.value)
            .collect();
        let expected: Vec<MeasurementValue> = [1, 2, 3, 2].into_iter().map(MeasurementValue::Int).collect();
        assert_eq!(values, expected);
        assert_eq!(recorder.pending_actor_calls("actorX"), Some(2));
    }

    #[test]
    fn test_concurrent_pending_calls_are_consistent() {
        let (recorder, sink) = enabled_recorder();
        let threads = 8;
        let rounds = 100;

        std::thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(|| {
                    for _ in 0..rounds {
                        recorder.report_actor_pending_calls("actorX", 1);
                        recorder.report_actor_pending_calls("actorX", 1);
                        recorder.report_actor_pending_calls("actorX", -1);
                    }
                });
            }
        });

        let samples = sink.samples_for("runtime/actor/pending_actor_calls");
        assert_eq!(samples.len(), threads * rounds * 3);
        let max = (threads * rounds * 2) as i64;
        for sample in &samples {
            match sample.measurement.value {
                MeasurementValue::Int(value) => assert!((0..=max).contains(&value), "value {value}"),
                other => panic!("unexpected gauge value {other:?}"),
            }
        }
        assert_eq!(recorder.pending_actor_calls("actorX"), Some((threads * rounds) as i32));
    }
}
