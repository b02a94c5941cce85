/// [`Identity`] caller identity as established by the mTLS layer.
///
/// Only read to populate tag values on access-control instruments.
pub trait Identity {
    fn app_id(&self) -> &str;
    fn trust_domain(&self) -> &str;
    fn namespace(&self) -> &str;
}

/// [`CallerIdentity`] plain owned identity, for callers that already hold the
/// parsed parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub app_id: String,
    pub trust_domain: String,
    pub namespace: String,
}

impl CallerIdentity {
    pub fn new(
        app_id: impl Into<String>,
        trust_domain: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            trust_domain: trust_domain.into(),
            namespace: namespace.into(),
        }
    }
}

impl Identity for CallerIdentity {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    fn trust_domain(&self) -> &str {
        &self.trust_domain
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }
}
