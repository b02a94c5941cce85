use crate::tags::{
    TagKey, ACTOR_TYPE, APP_ID, COMPONENT, COMPONENT_NAME, DESTINATION_APP_ID, FAIL_REASON,
    NAMESPACE, OPERATION, SOURCE_APP_ID, STATUS, SUCCESS, TRUST_DOMAIN, TYPE,
};
use crate::view::{Aggregation, MeasurementValue, View};

/// [`Unit`] unit of a recorded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Dimensionless,
    Milliseconds,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Dimensionless => "1",
            Unit::Milliseconds => "ms",
        }
    }
}

/// [`InstrumentKind`] how samples of an instrument are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentKind {
    /// Monotonic count, aggregated with [`Aggregation::Count`].
    Counter,
    /// Last written value wins, aggregated with [`Aggregation::LastValue`].
    Gauge,
    /// Distribution over explicit bucket bounds.
    Histogram,
}

/// [`Instrument`] a named measurement definition.
///
/// The name is the externally visible metric name. Dashboards key on it, so
/// neither the name nor the kind of a shipped instrument may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instrument {
    name: &'static str,
    description: &'static str,
    unit: Unit,
    kind: InstrumentKind,
    tag_keys: &'static [TagKey],
}

impl Instrument {
    const fn counter(name: &'static str, description: &'static str, tag_keys: &'static [TagKey]) -> Self {
        Self { name, description, unit: Unit::Dimensionless, kind: InstrumentKind::Counter, tag_keys }
    }

    const fn gauge(name: &'static str, description: &'static str, tag_keys: &'static [TagKey]) -> Self {
        Self { name, description, unit: Unit::Dimensionless, kind: InstrumentKind::Gauge, tag_keys }
    }

    const fn histogram(
        name: &'static str,
        description: &'static str,
        unit: Unit,
        tag_keys: &'static [TagKey],
    ) -> Self {
        Self { name, description, unit, kind: InstrumentKind::Histogram, tag_keys }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn kind(&self) -> InstrumentKind {
        self.kind
    }

    /// Ordered dimensions every sample of this instrument carries.
    pub fn tag_keys(&self) -> &'static [TagKey] {
        self.tag_keys
    }

    /// Builds the aggregation view for this instrument. `latency_buckets` is
    /// only consulted for histogram instruments.
    pub fn view(&self, latency_buckets: &[f64]) -> View {
        let aggregation = match self.kind {
            InstrumentKind::Counter => Aggregation::Count,
            InstrumentKind::Gauge => Aggregation::LastValue,
            InstrumentKind::Histogram => Aggregation::Distribution(latency_buckets.to_vec()),
        };
        View { instrument: *self, tag_keys: self.tag_keys, aggregation }
    }

    pub(crate) fn measure(&self, value: impl Into<MeasurementValue>) -> crate::view::Measurement {
        crate::view::Measurement { name: self.name, value: value.into() }
    }
}

const APP: &[TagKey] = &[APP_ID];
const APP_REASON: &[TagKey] = &[APP_ID, FAIL_REASON];
const APP_ACTOR: &[TagKey] = &[APP_ID, ACTOR_TYPE];
const APP_ACTOR_OPERATION: &[TagKey] = &[APP_ID, ACTOR_TYPE, OPERATION];
const APP_ACTOR_SUCCESS: &[TagKey] = &[APP_ID, ACTOR_TYPE, SUCCESS];
const APP_IDENTITY: &[TagKey] = &[APP_ID, TRUST_DOMAIN, NAMESPACE];

/// [`MeasurementRegistry`] the closed catalog of instruments the runtime reports.
pub struct MeasurementRegistry {
    // Component metrics
    pub component_loaded: Instrument,
    pub component_init_completed: Instrument,
    pub component_init_failed: Instrument,

    // mTLS metrics
    pub mtls_init_completed: Instrument,
    pub mtls_init_failed: Instrument,
    pub mtls_workload_cert_rotated: Instrument,
    pub mtls_workload_cert_rotated_failed: Instrument,

    // Actor metrics
    pub actor_status_report_total: Instrument,
    pub actor_status_report_failed_total: Instrument,
    pub actor_table_operation_recv_total: Instrument,
    pub actor_rebalanced_total: Instrument,
    pub actor_deactivation_total: Instrument,
    pub actor_deactivation_failed_total: Instrument,
    pub actor_pending_calls: Instrument,
    pub actor_timers: Instrument,
    pub actor_reminders: Instrument,
    pub actor_reminder_fired_total: Instrument,
    pub actor_timer_fired_total: Instrument,

    // Access control metrics for service invocation
    pub app_policy_action_allowed: Instrument,
    pub global_policy_action_allowed: Instrument,
    pub app_policy_action_blocked: Instrument,
    pub global_policy_action_blocked: Instrument,

    // Service invocation metrics
    pub service_invocation_request_sent_total: Instrument,
    pub service_invocation_request_received_total: Instrument,
    pub service_invocation_response_sent_total: Instrument,
    pub service_invocation_response_received_total: Instrument,
    pub service_invocation_response_received_latency: Instrument,
}

impl MeasurementRegistry {
    pub fn new() -> Self {
        Self {
            component_loaded: Instrument::counter(
                "runtime/component/loaded",
                "The number of successfully loaded components.",
                APP,
            ),
            component_init_completed: Instrument::counter(
                "runtime/component/init_total",
                "The number of initialized components.",
                &[APP_ID, COMPONENT],
            ),
            component_init_failed: Instrument::counter(
                "runtime/component/init_fail_total",
                "The number of component initialization failures.",
                &[APP_ID, COMPONENT, FAIL_REASON, COMPONENT_NAME],
            ),

            mtls_init_completed: Instrument::counter(
                "runtime/mtls/init_total",
                "The number of successful mTLS authenticator initialization.",
                APP,
            ),
            mtls_init_failed: Instrument::counter(
                "runtime/mtls/init_fail_total",
                "The number of mTLS authenticator init failures.",
                APP_REASON,
            ),
            mtls_workload_cert_rotated: Instrument::counter(
                "runtime/mtls/workload_cert_rotated_total",
                "The number of the successful workload certificate rotations.",
                APP,
            ),
            mtls_workload_cert_rotated_failed: Instrument::counter(
                "runtime/mtls/workload_cert_rotated_fail_total",
                "The number of the failed workload certificate rotations.",
                APP_REASON,
            ),

            actor_status_report_total: Instrument::counter(
                "runtime/actor/status_report_total",
                "The number of the successful status reports to placement service.",
                APP_ACTOR_OPERATION,
            ),
            actor_status_report_failed_total: Instrument::counter(
                "runtime/actor/status_report_fail_total",
                "The number of the failed status reports to placement service.",
                &[APP_ID, ACTOR_TYPE, OPERATION, FAIL_REASON],
            ),
            actor_table_operation_recv_total: Instrument::counter(
                "runtime/actor/table_operation_recv_total",
                "The number of the received actor placement table operations.",
                APP_ACTOR_OPERATION,
            ),
            actor_rebalanced_total: Instrument::counter(
                "runtime/actor/rebalanced_total",
                "The number of the actor rebalance requests.",
                APP_ACTOR,
            ),
            actor_deactivation_total: Instrument::counter(
                "runtime/actor/deactivated_total",
                "The number of the successful actor deactivation.",
                APP_ACTOR,
            ),
            actor_deactivation_failed_total: Instrument::counter(
                "runtime/actor/deactivated_failed_total",
                "The number of the failed actor deactivation.",
                &[APP_ID, ACTOR_TYPE, FAIL_REASON],
            ),
            actor_pending_calls: Instrument::gauge(
                "runtime/actor/pending_actor_calls",
                "The number of pending actor calls waiting to acquire the per-actor lock.",
                APP_ACTOR,
            ),
            actor_timers: Instrument::gauge(
                "runtime/actor/timers",
                "The number of actor timer requests.",
                APP_ACTOR,
            ),
            actor_reminders: Instrument::gauge(
                "runtime/actor/reminders",
                "The number of actor reminder requests.",
                APP_ACTOR,
            ),
            actor_reminder_fired_total: Instrument::counter(
                "runtime/actor/reminders_fired_total",
                "The number of actor reminders fired requests.",
                APP_ACTOR_SUCCESS,
            ),
            actor_timer_fired_total: Instrument::counter(
                "runtime/actor/timers_fired_total",
                "The number of actor timers fired requests.",
                APP_ACTOR_SUCCESS,
            ),

            app_policy_action_allowed: Instrument::counter(
                "runtime/acl/app_policy_action_allowed_total",
                "The number of requests allowed by the app specific action specified in the access control policy.",
                APP_IDENTITY,
            ),
            global_policy_action_allowed: Instrument::counter(
                "runtime/acl/global_policy_action_allowed_total",
                "The number of requests allowed by the global action specified in the access control policy.",
                APP_IDENTITY,
            ),
            app_policy_action_blocked: Instrument::counter(
                "runtime/acl/app_policy_action_blocked_total",
                "The number of requests blocked by the app specific action specified in the access control policy.",
                APP_IDENTITY,
            ),
            global_policy_action_blocked: Instrument::counter(
                "runtime/acl/global_policy_action_blocked_total",
                "The number of requests blocked by the global action specified in the access control policy.",
                APP_IDENTITY,
            ),

            service_invocation_request_sent_total: Instrument::counter(
                "runtime/service_invocation/req_sent_total",
                "The number of requests sent via service invocation.",
                &[APP_ID, DESTINATION_APP_ID, TYPE],
            ),
            service_invocation_request_received_total: Instrument::counter(
                "runtime/service_invocation/req_recv_total",
                "The number of requests received via service invocation.",
                &[APP_ID, SOURCE_APP_ID],
            ),
            service_invocation_response_sent_total: Instrument::counter(
                "runtime/service_invocation/res_sent_total",
                "The number of responses sent via service invocation.",
                &[APP_ID, DESTINATION_APP_ID, STATUS],
            ),
            service_invocation_response_received_total: Instrument::counter(
                "runtime/service_invocation/res_recv_total",
                "The number of responses received via service invocation.",
                &[APP_ID, SOURCE_APP_ID, STATUS, TYPE],
            ),
            service_invocation_response_received_latency: Instrument::histogram(
                "runtime/service_invocation/res_recv_latency_ms",
                "The latency of service invocation response.",
                Unit::Milliseconds,
                &[APP_ID, SOURCE_APP_ID, STATUS],
            ),
        }
    }

    /// Every declared instrument, in declaration order.
    pub fn instruments(&self) -> [&Instrument; 27] {
        [
            &self.component_loaded,
            &self.component_init_completed,
            &self.component_init_failed,
            &self.mtls_init_completed,
            &self.mtls_init_failed,
            &self.mtls_workload_cert_rotated,
            &self.mtls_workload_cert_rotated_failed,
            &self.actor_status_report_total,
            &self.actor_status_report_failed_total,
            &self.actor_table_operation_recv_total,
            &self.actor_rebalanced_total,
            &self.actor_deactivation_total,
            &self.actor_deactivation_failed_total,
            &self.actor_pending_calls,
            &self.actor_timers,
            &self.actor_reminders,
            &self.actor_reminder_fired_total,
            &self.actor_timer_fired_total,
            &self.app_policy_action_allowed,
            &self.global_policy_action_allowed,
            &self.app_policy_action_blocked,
            &self.global_policy_action_blocked,
            &self.service_invocation_request_sent_total,
            &self.service_invocation_request_received_total,
            &self.service_invocation_response_sent_total,
            &self.service_invocation_response_received_total,
            &self.service_invocation_response_received_latency,
        ]
    }

    /// One view per instrument, bound to its declared tag keys.
    pub fn views(&self, latency_buckets: &[f64]) -> Vec<View> {
        self.instruments()
            .iter()
            .map(|instrument| instrument.view(latency_buckets))
            .collect()
    }
}

impl Default for MeasurementRegistry {
    fn default() -> Self {
        Self::new()
    }
}
