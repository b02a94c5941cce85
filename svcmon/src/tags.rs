use std::fmt;

/// [`TagKey`] name of a dimension attached to a recorded sample.
///
/// The string form is part of the exported metric identity, so the constants
/// below must never be renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagKey(&'static str);

impl TagKey {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub const fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub const APP_ID: TagKey = TagKey::new("app_id");
pub const COMPONENT: TagKey = TagKey::new("component");
pub const COMPONENT_NAME: TagKey = TagKey::new("componentName");
pub const FAIL_REASON: TagKey = TagKey::new("reason");
pub const OPERATION: TagKey = TagKey::new("operation");
pub const ACTOR_TYPE: TagKey = TagKey::new("actor_type");
pub const SUCCESS: TagKey = TagKey::new("success");
pub const TRUST_DOMAIN: TagKey = TagKey::new("trustDomain");
pub const NAMESPACE: TagKey = TagKey::new("namespace");
pub const DESTINATION_APP_ID: TagKey = TagKey::new("dst_app_id");
pub const SOURCE_APP_ID: TagKey = TagKey::new("src_app_id");
pub const STATUS: TagKey = TagKey::new("status");
pub const TYPE: TagKey = TagKey::new("type");

// Values of the `type` dimension on service invocation instruments.
pub(crate) const TYPE_UNARY: &str = "unary";
pub(crate) const TYPE_STREAMING: &str = "streaming";

/// [`Tag`] a key/value pair attached to one submitted sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: TagKey,
    pub value: String,
}

impl Tag {
    pub fn new(key: TagKey, value: impl Into<String>) -> Self {
        Self { key, value: value.into() }
    }
}

/// Pairs an ordered key set with the values supplied by a recording call.
pub(crate) fn zip_tags(keys: &[TagKey], values: &[&str]) -> Vec<Tag> {
    debug_assert_eq!(keys.len(), values.len(), "tag values must match the declared key set");
    keys.iter()
        .zip(values)
        .map(|(key, value)| Tag::new(*key, *value))
        .collect()
}
