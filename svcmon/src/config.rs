use anyhow::{Context as _, Result};
use gethostname::gethostname;
use serde::Deserialize;

/// Latency bucket bounds in milliseconds used when none are configured.
pub const DEFAULT_LATENCY_BUCKETS_MS: [f64; 34] = [
    1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0, 13.0, 16.0, 20.0, 25.0, 30.0, 40.0, 50.0, 65.0, 80.0,
    100.0, 130.0, 160.0, 200.0, 250.0, 300.0, 400.0, 500.0, 650.0, 800.0, 1_000.0, 2_000.0,
    5_000.0, 10_000.0, 20_000.0, 50_000.0, 100_000.0,
];

/// [`MetricsConfig`] process level metrics settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfig {
    /// Whether the recorder gets initialized at all
    #[serde(default = "default_enabled")]
    pub(crate) enabled: bool,

    /// Identity tag attached to every sample recorded by this process
    #[serde(default)]
    pub(crate) app_id: String,

    /// Upper bounds of the service invocation latency histogram
    #[serde(default = "default_latency_buckets")]
    pub(crate) latency_buckets_ms: Vec<f64>,
}

fn default_enabled() -> bool {
    true
}

fn default_latency_buckets() -> Vec<f64> {
    DEFAULT_LATENCY_BUCKETS_MS.to_vec()
}

impl MetricsConfig {
    /// Parses a JSON document, filling and validating it like the builder does.
    ///
    /// ```ignore
    /// let config = MetricsConfig::from_json(r#"{ "appId": "checkout", "enabled": true }"#)?;
    /// ```
    pub fn from_json(document: &str) -> Result<Self> {
        let config: MetricsConfig =
            serde_json::from_str(document).context("unable to parse metrics config")?;
        MetricsConfigBuilder {
            enabled: config.enabled,
            app_id: (!config.app_id.is_empty()).then_some(config.app_id),
            latency_buckets_ms: config.latency_buckets_ms,
        }
        .build()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn latency_buckets(&self) -> &[f64] {
        &self.latency_buckets_ms
    }
}

pub struct MetricsConfigBuilder {
    pub(crate) enabled: bool,
    pub(crate) app_id: Option<String>,
    pub(crate) latency_buckets_ms: Vec<f64>,
}

impl Default for MetricsConfigBuilder {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            app_id: None,
            latency_buckets_ms: default_latency_buckets(),
        }
    }
}

impl MetricsConfigBuilder {
    /// Creates a new [`MetricsConfigBuilder`] with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables metrics collection.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the app id used as the identity tag
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Sets the latency histogram bucket bounds, in milliseconds
    pub fn with_latency_buckets(mut self, buckets: impl Into<Vec<f64>>) -> Self {
        self.latency_buckets_ms = buckets.into();
        self
    }

    /// Validates the current configuration
    ///
    /// Buckets must be finite, positive and strictly increasing.
    pub(crate) fn validate(&self) -> Result<()> {
        match &self.app_id {
            Some(app_id) if app_id.trim().is_empty() => anyhow::bail!("app id is empty"),
            _ => {}
        }
        if self.latency_buckets_ms.is_empty() {
            anyhow::bail!("latency buckets are not set");
        }
        if let Some(bound) = self.latency_buckets_ms.iter().find(|b| !b.is_finite() || **b <= 0.0) {
            anyhow::bail!("latency bucket bound {} must be finite and positive", bound);
        }
        if self.latency_buckets_ms.windows(2).any(|pair| pair[0] >= pair[1]) {
            anyhow::bail!("latency buckets must be strictly increasing");
        }
        Ok(())
    }

    /// Builds the final [`MetricsConfig`]
    ///
    /// If the app id is not set, the host name of the machine is used.
    pub fn build(mut self) -> Result<MetricsConfig> {
        self.validate()?;
        self.fill()?;

        Ok(MetricsConfig {
            enabled: self.enabled,
            app_id: self.app_id.unwrap_or_default(),
            latency_buckets_ms: self.latency_buckets_ms,
        })
    }

    /// Fills in any missing fields with default values
    fn fill(&mut self) -> Result<()> {
        if self.app_id.is_none() {
            let host = gethostname()
                .into_string()
                .map_err(|_| anyhow::anyhow!("host name is not valid unicode"))?;
            self.app_id = Some(host);
        }
        Ok(())
    }
}
