use serde::{Deserialize, Serialize};

pub const API_VERSION: &str = "apiserver.config.k8s.io/v1";
pub const KIND: &str = "EncryptionConfiguration";

/// Encryption at rest configuration passed to the API server via
/// `--encryption-provider-config`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionConfiguration {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    #[serde(default)]
    pub resources: Vec<ResourceConfiguration>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResourceConfiguration {
    pub resources: Vec<String>,

    /// Ordered list of providers; the first one encrypts, all of them decrypt.
    pub providers: Vec<ProviderConfiguration>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderConfiguration {
    Aesgcm(AesConfiguration),
    Aescbc(AesConfiguration),
    Secretbox(SecretboxConfiguration),
    Identity(IdentityConfiguration),
    Kms(KmsConfiguration),
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct AesConfiguration {
    pub keys: Vec<Key>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SecretboxConfiguration {
    pub keys: Vec<Key>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct IdentityConfiguration {}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct KmsConfiguration {
    pub name: String,

    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cachesize: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Key {
    pub name: String,

    /// Base64 encoded key material.
    pub secret: String,
}
