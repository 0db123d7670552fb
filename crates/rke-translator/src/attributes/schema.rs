use std::collections::BTreeMap;

use super::AttributeKind;

/// The top-level attributes of a resource and the kind of value each of them holds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    attributes: BTreeMap<&'static str, AttributeKind>,
}

impl Schema {
    pub fn new(attributes: impl IntoIterator<Item = (&'static str, AttributeKind)>) -> Self {
        Self {
            attributes: attributes.into_iter().collect(),
        }
    }

    /// The schema of the `rke_cluster` resource, including its computed attributes.
    pub fn rke_cluster() -> Self {
        use AttributeKind::{Bool, Int, List, String};

        Self::new([
            ("addon_job_timeout", Int),
            ("addons", String),
            ("addons_include", List),
            ("api_server_url", String),
            ("authentication", List),
            ("authorization", List),
            ("bastion_host", List),
            ("ca_crt", String),
            ("cert_dir", String),
            ("certificates", List),
            ("client_cert", String),
            ("client_key", String),
            ("cloud_provider", List),
            ("cluster_cidr", String),
            ("cluster_dns_server", String),
            ("cluster_domain", String),
            ("cluster_name", String),
            ("cluster_yaml", String),
            ("control_plane_hosts", List),
            ("custom_certs", Bool),
            ("dind", Bool),
            ("disable_port_check", Bool),
            ("dns", List),
            ("etcd_hosts", List),
            ("ignore_docker_version", Bool),
            ("inactive_hosts", List),
            ("ingress", List),
            ("kube_admin_user", String),
            ("kubernetes_version", String),
            ("monitoring", List),
            ("network", List),
            ("nodes", List),
            ("prefix_path", String),
            ("private_registries", List),
            ("restore", List),
            ("rke_cluster_yaml", String),
            ("rotate_certificates", List),
            ("running_system_images", List),
            ("services", List),
            ("ssh_agent_auth", Bool),
            ("ssh_cert_path", String),
            ("ssh_key_path", String),
            ("system_images", List),
            ("update_only", Bool),
            ("upgrade_strategy", List),
            ("worker_hosts", List),
        ])
    }

    pub fn kind_of(&self, name: &str) -> Option<AttributeKind> {
        self.attributes.get(name).copied()
    }
}
