use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    apiserver::{audit, encryption::EncryptionConfiguration, event_rate_limit},
    is_false, is_zero,
};

/// Settings of the Kubernetes components the engine deploys.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Services {
    pub etcd: EtcdService,

    #[serde(rename = "kube-api")]
    pub kube_api: KubeApiService,

    #[serde(rename = "kube-controller")]
    pub kube_controller: KubeControllerService,

    pub scheduler: SchedulerService,

    pub kubelet: KubeletService,

    pub kubeproxy: KubeproxyService,
}

/// Settings shared by every component container.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct BaseService {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_args: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_binds: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_env: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EtcdService {
    #[serde(flatten)]
    pub base: BaseService,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external_urls: Vec<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub ca_cert: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub cert: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(skip_serializing_if = "is_zero")]
    pub uid: i64,

    #[serde(skip_serializing_if = "is_zero")]
    pub gid: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<bool>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub retention: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub creation: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_config: Option<BackupConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct BackupConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "is_zero")]
    pub interval_hours: i64,

    #[serde(skip_serializing_if = "is_zero")]
    pub retention: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3_backup_config: Option<S3BackupConfig>,

    #[serde(skip_serializing_if = "is_false")]
    pub safe_timestamp: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct S3BackupConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub access_key: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_key: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub bucket_name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub endpoint: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub custom_ca: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub folder: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct KubeApiService {
    #[serde(flatten)]
    pub base: BaseService,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_cluster_ip_range: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_node_port_range: String,

    #[serde(skip_serializing_if = "is_false")]
    pub pod_security_policy: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub always_pull_images: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secrets_encryption_config: Option<SecretsEncryptionConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit_log: Option<AuditLog>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_rate_limit: Option<EventRateLimit>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SecretsEncryptionConfig {
    pub enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_config: Option<EncryptionConfiguration>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AuditLog {
    pub enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<AuditLogConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AuditLogConfig {
    #[serde(skip_serializing_if = "is_zero")]
    pub max_age: i64,

    #[serde(skip_serializing_if = "is_zero")]
    pub max_backup: i64,

    #[serde(skip_serializing_if = "is_zero")]
    pub max_size: i64,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<audit::Policy>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EventRateLimit {
    pub enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<event_rate_limit::Configuration>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct KubeControllerService {
    #[serde(flatten)]
    pub base: BaseService,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_cidr: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_cluster_ip_range: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SchedulerService {
    #[serde(flatten)]
    pub base: BaseService,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct KubeletService {
    #[serde(flatten)]
    pub base: BaseService,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_domain: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub infra_container_image: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_dns_server: String,

    #[serde(skip_serializing_if = "is_false")]
    pub fail_swap_on: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub generate_serving_certificate: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct KubeproxyService {
    #[serde(flatten)]
    pub base: BaseService,
}
