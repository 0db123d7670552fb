use std::collections::BTreeMap;

use crate::{
    ClusterConfig,
    nodes::{Node, Role},
};

/// Name of the certificate authority in the certificate bundle.
pub const CA_CERT_NAME: &str = "kube-ca";

/// Name of the admin client certificate in the certificate bundle.
pub const KUBE_ADMIN_CERT_NAME: &str = "kube-admin";

/// Port the API server listens on.
pub const API_SERVER_PORT: u16 = 6443;

/// State of a cluster as reported by the bootstrap engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cluster {
    pub config: ClusterConfig,

    /// Whether the cluster runs its nodes as Docker-in-Docker containers.
    pub dind: bool,

    pub etcd_hosts: Vec<Host>,
    pub control_plane_hosts: Vec<Host>,
    pub worker_hosts: Vec<Host>,

    /// Hosts which are part of the configuration but could not be reached.
    pub inactive_hosts: Vec<Host>,

    /// Certificates keyed by their id, e.g. [`CA_CERT_NAME`].
    pub certificates: BTreeMap<String, CertificatePki>,

    pub cluster_domain: String,
    pub cluster_cidr: String,
    pub cluster_dns_server: String,
}

impl Cluster {
    /// Builds the cluster state the engine derives from `config` before contacting any host.
    ///
    /// Nodes are partitioned into host lists by role, a node with several roles shows up in
    /// several lists.
    pub fn from_config(config: ClusterConfig, dind: bool) -> Self {
        let hosts_with = |role: Role| -> Vec<Host> {
            config
                .nodes
                .iter()
                .filter(|node| node.has_role(role))
                .map(Host::from)
                .collect()
        };

        Self {
            etcd_hosts: hosts_with(Role::Etcd),
            control_plane_hosts: hosts_with(Role::Controlplane),
            worker_hosts: hosts_with(Role::Worker),
            inactive_hosts: Vec::new(),
            certificates: BTreeMap::new(),
            cluster_domain: config.services.kubelet.cluster_domain.clone(),
            cluster_cidr: config.services.kube_controller.cluster_cidr.clone(),
            cluster_dns_server: config.services.kubelet.cluster_dns_server.clone(),
            config,
            dind,
        }
    }

    /// URL of the API server on the first control plane host, if there is one.
    pub fn api_server_url(&self) -> Option<String> {
        self.control_plane_hosts
            .first()
            .map(|host| format!("https://{}:{API_SERVER_PORT}", host.address))
    }

    pub fn certificate(&self, name: &str) -> Option<&CertificatePki> {
        self.certificates.get(name)
    }
}

/// A host of a running cluster.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Host {
    pub address: String,
    pub node_name: String,
}

impl From<&Node> for Host {
    fn from(node: &Node) -> Self {
        let node_name = if node.hostname_override.is_empty() {
            node.address.clone()
        } else {
            node.hostname_override.clone()
        };

        Self {
            address: node.address.clone(),
            node_name,
        }
    }
}

/// A certificate and its key, PEM encoded, together with where the engine deploys them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CertificatePki {
    pub name: String,
    pub common_name: String,
    pub ou_name: String,
    pub certificate: String,
    pub key: String,
    pub config: String,
    pub env_name: String,
    pub path: String,
    pub key_env_name: String,
    pub key_path: String,
    pub config_env_name: String,
    pub config_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(address: &str, roles: &[Role]) -> Node {
        Node {
            address: address.to_owned(),
            user: "ubuntu".to_owned(),
            role: roles.to_vec(),
            ..Node::default()
        }
    }

    #[test]
    fn from_config_partitions_hosts_by_role() {
        let config = ClusterConfig {
            nodes: vec![
                node("10.0.0.1", &[Role::Controlplane, Role::Etcd]),
                node("10.0.0.2", &[Role::Worker]),
            ],
            ..ClusterConfig::default()
        };

        let cluster = Cluster::from_config(config, false);

        let addresses = |hosts: &[Host]| -> Vec<String> {
            hosts.iter().map(|host| host.address.clone()).collect()
        };
        assert_eq!(addresses(&cluster.control_plane_hosts), ["10.0.0.1"]);
        assert_eq!(addresses(&cluster.etcd_hosts), ["10.0.0.1"]);
        assert_eq!(addresses(&cluster.worker_hosts), ["10.0.0.2"]);
        assert!(cluster.inactive_hosts.is_empty());
    }

    #[test]
    fn api_server_url_uses_first_control_plane_host() {
        let cluster = Cluster {
            control_plane_hosts: vec![
                Host {
                    address: "10.0.0.5".to_owned(),
                    node_name: "cp-0".to_owned(),
                },
                Host {
                    address: "10.0.0.6".to_owned(),
                    node_name: "cp-1".to_owned(),
                },
            ],
            ..Cluster::default()
        };

        assert_eq!(
            cluster.api_server_url().as_deref(),
            Some("https://10.0.0.5:6443")
        );
        assert_eq!(Cluster::default().api_server_url(), None);
    }

    #[test]
    fn host_name_prefers_hostname_override() {
        let mut node = node("10.0.0.1", &[Role::Worker]);
        assert_eq!(Host::from(&node).node_name, "10.0.0.1");

        node.hostname_override = "worker-0".to_owned();
        assert_eq!(Host::from(&node).node_name, "worker-0");
    }
}
