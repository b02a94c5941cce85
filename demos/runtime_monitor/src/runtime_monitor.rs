use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use metrics_util::debugging::DebuggingRecorder;
use svcmon::{CallerIdentity, MetricsConfig, MetricsConfigBuilder, MetricsRecorder};
use svcmon_metrics::MetricsSink;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

const ACTOR_TYPES: [&str; 3] = ["cart", "order", "inventory"];
const CALLER_APP_ID: &str = "frontend";
const DOWNSTREAM_APP_ID: &str = "payments";

#[derive(Parser, Debug)]
#[command(author, version, about = "Simulates runtime traffic and prints the recorded metrics")]
struct Args {
    /// App id used as identity tag. Defaults to the host name.
    #[arg(long)]
    app_id: Option<String>,

    /// JSON metrics configuration. Overrides the other metric flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run with metrics disabled.
    #[arg(long, default_value_t = false)]
    disable_metrics: bool,

    /// Concurrent calls issued per actor type.
    #[arg(long, default_value_t = 20)]
    calls: usize,
}

fn load_config(args: &Args) -> Result<MetricsConfig> {
    if let Some(path) = &args.config {
        let document = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read {}", path.display()))?;
        return MetricsConfig::from_json(&document);
    }

    let mut builder = MetricsConfigBuilder::new().with_enabled(!args.disable_metrics);
    if let Some(app_id) = &args.app_id {
        builder = builder.with_app_id(app_id.clone());
    }
    builder.build()
}

/// Every call waits for the per-actor lock, which is what the pending calls
/// gauge tracks.
async fn invoke_actor(recorder: Arc<MetricsRecorder>, actor_type: &'static str, lock: Arc<Mutex<()>>) {
    recorder.service_invocation_request_received(CALLER_APP_ID);

    recorder.report_actor_pending_calls(actor_type, 1);
    let _guard = lock.lock().await;
    recorder.report_actor_pending_calls(actor_type, -1);

    tokio::time::sleep(Duration::from_millis(2)).await;
    recorder.service_invocation_response_sent(CALLER_APP_ID, 200);
}

async fn call_downstream(recorder: &MetricsRecorder) {
    recorder.service_invocation_request_sent(DOWNSTREAM_APP_ID);
    let start = Instant::now();
    tokio::time::sleep(Duration::from_millis(15)).await;
    recorder.service_invocation_response_received(DOWNSTREAM_APP_ID, 200, start);

    recorder.service_invocation_streaming_request_sent(DOWNSTREAM_APP_ID);
    recorder.service_invocation_streaming_response_received(DOWNSTREAM_APP_ID, 14);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let debugging = DebuggingRecorder::new();
    let snapshotter = debugging.snapshotter();
    debugging
        .install()
        .map_err(|e| anyhow!("unable to install metrics recorder: {}", e))?;

    let recorder = Arc::new(MetricsRecorder::default());
    let sink = Arc::new(MetricsSink::new());
    match recorder.init_with_config(sink, &config) {
        Ok(true) => info!("[RUNTIME] Metrics enabled for `{}`", config.app_id()),
        Ok(false) => info!("[RUNTIME] Metrics disabled"),
        Err(e) => error!("[RUNTIME] Continuing without metrics: {}", e),
    }

    recorder.mtls_init_completed();
    recorder.component_loaded();
    recorder.component_initialized("state.redis");
    recorder.component_init_failed("pubsub.kafka", "init timeout", "orders-pubsub");
    for actor_type in ACTOR_TYPES {
        recorder.actor_placement_table_operation_received(actor_type, "update");
        recorder.actor_status_reported(actor_type, "update");
        recorder.actor_reminders(actor_type, 1);
    }

    let caller = CallerIdentity::new(CALLER_APP_ID, "public", "default");
    recorder.request_allowed_by_app_action(&caller);

    let mut handles = Vec::new();
    for actor_type in ACTOR_TYPES {
        let lock = Arc::new(Mutex::new(()));
        for _ in 0..args.calls {
            handles.push(tokio::spawn(invoke_actor(recorder.clone(), actor_type, lock.clone())));
        }
    }
    for result in futures::future::join_all(handles).await {
        if let Err(e) = result {
            error!("[RUNTIME] Actor call panicked: {}", e);
        }
    }

    call_downstream(&recorder).await;
    for actor_type in ACTOR_TYPES {
        recorder.actor_reminder_fired(actor_type, true);
        recorder.actor_deactivated(actor_type);
    }

    for (key, unit, _, value) in snapshotter.snapshot().into_vec() {
        let labels: Vec<String> = key
            .key()
            .labels()
            .map(|label| format!("{}={}", label.key(), label.value()))
            .collect();
        info!(
            "{} {{{}}} {:?} {}",
            key.key().name(),
            labels.join(","),
            value,
            unit.map(|u| u.as_canonical_label()).unwrap_or(""),
        );
    }

    for actor_type in ACTOR_TYPES {
        info!(
            "[RUNTIME] pending calls for `{}`: {}",
            actor_type,
            recorder.pending_actor_calls(actor_type).unwrap_or_default(),
        );
    }

    Ok(())
}
