use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "eventratelimit.admission.k8s.io/v1alpha1";
pub const KIND: &str = "Configuration";

/// Configuration of the `EventRateLimit` admission plugin.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub limits: Vec<Limit>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Limit {
    #[serde(rename = "type")]
    pub limit_type: LimitType,

    #[serde(default)]
    pub qps: i32,

    #[serde(default)]
    pub burst: i32,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub cache_size: i32,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum LimitType {
    Server,
    Namespace,
    User,
    SourceAndObject,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}
