use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    is_default, is_false, is_zero, nodes::Node, services::Services,
    system_images::SystemImages,
};

/// The `cluster.yml` document consumed by the bootstrap engine.
///
/// Every field defaults to its zero value, and zero values are left out when the document is
/// serialized.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ClusterConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,

    pub services: Services,

    #[serde(skip_serializing_if = "is_default")]
    pub network: NetworkConfig,

    #[serde(skip_serializing_if = "is_default")]
    pub authentication: AuthnConfig,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub addons: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addons_include: Vec<String>,

    #[serde(skip_serializing_if = "is_default")]
    pub system_images: SystemImages,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_key_path: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_cert_path: String,

    #[serde(skip_serializing_if = "is_false")]
    pub ssh_agent_auth: bool,

    #[serde(skip_serializing_if = "is_default")]
    pub authorization: AuthzConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_docker_version: Option<bool>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub kubernetes_version: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub private_registries: Vec<PrivateRegistry>,

    #[serde(skip_serializing_if = "is_default")]
    pub ingress: IngressConfig,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,

    #[serde(skip_serializing_if = "is_default")]
    pub cloud_provider: CloudProvider,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub prefix_path: String,

    #[serde(skip_serializing_if = "is_zero")]
    pub addon_job_timeout: i64,

    #[serde(skip_serializing_if = "is_default")]
    pub bastion_host: BastionHost,

    #[serde(skip_serializing_if = "is_default")]
    pub monitoring: MonitoringConfig,

    #[serde(skip_serializing_if = "is_default")]
    pub restore: RestoreConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate_certificates: Option<RotateCertificates>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<DnsConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_strategy: Option<NodeUpgradeStrategy>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub plugin: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "is_zero")]
    pub mtu: i64,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AuthnConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub strategy: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sans: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<AuthWebhookConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AuthWebhookConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub config_file: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub cache_timeout: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AuthzConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mode: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PrivateRegistry {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,

    #[serde(skip_serializing_if = "is_false")]
    pub is_default: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct IngressConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub provider: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_args: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub dns_policy: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CloudProvider {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Raw cloud config for providers the engine has no typed support for.
    #[serde(
        rename = "customCloudProvider",
        skip_serializing_if = "String::is_empty"
    )]
    pub custom_cloud_provider: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct BastionHost {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub address: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub port: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,

    #[serde(skip_serializing_if = "is_false")]
    pub ssh_agent_auth: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_key: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_key_path: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_cert: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub ssh_cert_path: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MonitoringConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub provider: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RestoreConfig {
    #[serde(skip_serializing_if = "is_false")]
    pub restore: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub snapshot_name: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RotateCertificates {
    #[serde(skip_serializing_if = "is_false")]
    pub ca_certificates: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DnsConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub provider: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub upstream_nameservers: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reverse_cidrs: Vec<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodelocal: Option<Nodelocal>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Nodelocal {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ip_address: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NodeUpgradeStrategy {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub max_unavailable_worker: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub max_unavailable_controlplane: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub drain: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_drain_input: Option<NodeDrainInput>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NodeDrainInput {
    #[serde(skip_serializing_if = "is_false")]
    pub force: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_daemonsets: Option<bool>,

    #[serde(skip_serializing_if = "is_false")]
    pub delete_local_data: bool,

    #[serde(skip_serializing_if = "is_zero")]
    pub grace_period: i64,

    #[serde(skip_serializing_if = "is_zero")]
    pub timeout: i64,
}
