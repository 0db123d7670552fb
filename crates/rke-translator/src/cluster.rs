//! Translates between the `rke_cluster` attributes and the engine's cluster configuration.
use rke_config::{Cluster, ClusterConfig, cluster::KUBE_ADMIN_CERT_NAME};
use snafu::{ResultExt, Snafu};

use crate::{
    attributes::{AttributeError, AttributeValue, ResourceData},
    flags, patch,
    presence::Section,
    sections::{
        self, authentication, authorization, bastion_host, certificates, cloud_provider, dns,
        ingress, monitoring, network, nodes, private_registries, restore, rotate_certificates,
        services, system_images, upgrade_strategy,
    },
};

type Result<T, E = Error> = std::result::Result<T, E>;

pub const CLUSTER_YAML: &str = "cluster_yaml";
pub const SYSTEM_IMAGES: &str = "system_images";

const ADDON_JOB_TIMEOUT: &str = "addon_job_timeout";
const CLUSTER_NAME: &str = "cluster_name";
const IGNORE_DOCKER_VERSION: &str = "ignore_docker_version";
const KUBERNETES_VERSION: &str = "kubernetes_version";
const PREFIX_PATH: &str = "prefix_path";
const SSH_AGENT_AUTH: &str = "ssh_agent_auth";
const SSH_CERT_PATH: &str = "ssh_cert_path";
const SSH_KEY_PATH: &str = "ssh_key_path";

const API_SERVER_URL: &str = "api_server_url";
const CA_CRT: &str = "ca_crt";
const CLIENT_CERT: &str = "client_cert";
const CLIENT_KEY: &str = "client_key";
const CERTIFICATES: &str = "certificates";
const KUBE_ADMIN_USER: &str = "kube_admin_user";
const CLUSTER_DOMAIN: &str = "cluster_domain";
const CLUSTER_CIDR: &str = "cluster_cidr";
const CLUSTER_DNS_SERVER: &str = "cluster_dns_server";
const ETCD_HOSTS: &str = "etcd_hosts";
const CONTROL_PLANE_HOSTS: &str = "control_plane_hosts";
const WORKER_HOSTS: &str = "worker_hosts";
const INACTIVE_HOSTS: &str = "inactive_hosts";
const RUNNING_SYSTEM_IMAGES: &str = "running_system_images";

/// Kube-proxy argument injected in Docker-in-Docker mode.
pub const CONNTRACK_MAX_PER_CORE: &str = "conntrack-max-per-core";

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to parse the cluster_yaml seed document"))]
    ParseSeed { source: rke_config::Error },

    #[snafu(display("failed to expand the {section} section"))]
    ExpandSection {
        source: sections::Error,
        section: Section,
    },

    #[snafu(display("failed to patch the cluster document"))]
    PatchDocument { source: patch::Error },

    #[snafu(display("failed to flatten the {section} section"))]
    FlattenSection {
        source: sections::Error,
        section: Section,
    },

    #[snafu(display("failed to write attribute {name:?}"))]
    WriteAttribute {
        source: AttributeError,
        name: &'static str,
    },
}

/// Builds the cluster configuration from `attrs` and encodes it into the document handed to the
/// engine.
///
/// If `cluster_yaml` holds a document, it seeds the configuration and the attributes are laid
/// over it.
pub fn expand(attrs: &impl ResourceData) -> Result<(String, ClusterConfig)> {
    let mut config = match attrs.get_str(CLUSTER_YAML) {
        Some(seed) => rke_config::parse_config(seed).context(ParseSeedSnafu)?,
        None => ClusterConfig::default(),
    };

    expand_scalars(attrs, &mut config);
    expand_sections(attrs, &mut config)?;

    if attrs.get_bool(flags::DIND).unwrap_or_default() {
        config
            .services
            .kubeproxy
            .base
            .extra_args
            .insert(CONNTRACK_MAX_PER_CORE.to_owned(), "0".to_owned());
    }

    let document = patch::patch(&config, attrs).context(PatchDocumentSnafu)?;
    tracing::debug!(
        cluster_name = %config.cluster_name,
        nodes = config.nodes.len(),
        "expanded cluster configuration"
    );

    Ok((document, config))
}

fn expand_scalars(attrs: &impl ResourceData, config: &mut ClusterConfig) {
    let string = |name: &str| attrs.get_str(name).map(ToOwned::to_owned);

    if let Some(timeout) = attrs.get_int(ADDON_JOB_TIMEOUT).filter(|timeout| *timeout > 0) {
        config.addon_job_timeout = timeout;
    }
    if let Some(addons) = string(Section::Addons.attribute()) {
        config.addons = addons;
    }
    let addons_include: Vec<String> = attrs
        .get(Section::AddonsInclude.attribute())
        .and_then(AttributeValue::as_list)
        .unwrap_or_default()
        .iter()
        .filter_map(AttributeValue::as_str)
        .map(ToOwned::to_owned)
        .collect();
    if !addons_include.is_empty() {
        config.addons_include = addons_include;
    }
    if let Some(cluster_name) = string(CLUSTER_NAME) {
        config.cluster_name = cluster_name;
    }
    if let Some(ignore_docker_version) = attrs.get_bool(IGNORE_DOCKER_VERSION) {
        config.ignore_docker_version = Some(ignore_docker_version);
    }
    if let Some(version) = string(KUBERNETES_VERSION) {
        config.kubernetes_version = version;
    }
    if let Some(prefix_path) = string(PREFIX_PATH) {
        config.prefix_path = prefix_path;
    }
    if attrs.get_bool(SSH_AGENT_AUTH).unwrap_or_default() {
        config.ssh_agent_auth = true;
    }
    if let Some(path) = string(SSH_CERT_PATH) {
        config.ssh_cert_path = path;
    }
    if let Some(path) = string(SSH_KEY_PATH) {
        config.ssh_key_path = path;
    }
}

fn expand_sections(attrs: &impl ResourceData, config: &mut ClusterConfig) -> Result<()> {
    let section_block = |section: Section| attrs.get_block(section.attribute());

    if let Some(block) = section_block(Section::Authentication) {
        config.authentication = authentication::expand(&block);
    }
    if let Some(block) = section_block(Section::Authorization) {
        config.authorization = authorization::expand(&block);
    }
    if let Some(block) = section_block(Section::BastionHost) {
        config.bastion_host = bastion_host::expand(&block);
    }
    if let Some(block) = section_block(Section::CloudProvider) {
        config.cloud_provider = cloud_provider::expand(&block);
    }
    if let Some(block) = section_block(Section::Dns) {
        config.dns = Some(dns::expand(&block));
    }
    if let Some(block) = section_block(Section::Ingress) {
        config.ingress = ingress::expand(&block);
    }
    if let Some(block) = section_block(Section::Monitoring) {
        config.monitoring = monitoring::expand(&block);
    }
    if let Some(block) = section_block(Section::Network) {
        config.network = network::expand(&block);
    }

    let node_blocks = attrs.get_blocks(Section::Nodes.attribute());
    if !node_blocks.is_empty() {
        config.nodes = nodes::expand(&node_blocks).context(ExpandSectionSnafu {
            section: Section::Nodes,
        })?;
    }

    let registry_blocks = attrs.get_blocks(Section::PrivateRegistries.attribute());
    if !registry_blocks.is_empty() {
        config.private_registries = private_registries::expand(&registry_blocks);
    }

    if let Some(block) = section_block(Section::Restore) {
        config.restore = restore::expand(&block);
    }
    if let Some(block) = section_block(Section::RotateCertificates) {
        config.rotate_certificates = Some(rotate_certificates::expand(&block));
    }
    if let Some(block) = attrs.get_block(SYSTEM_IMAGES) {
        config.system_images = system_images::expand(&block);
    }
    if let Some(block) = section_block(Section::UpgradeStrategy) {
        config.upgrade_strategy = Some(upgrade_strategy::expand(&block));
    }
    if let Some(block) = section_block(Section::Services) {
        config.services = services::expand(&block).context(ExpandSectionSnafu {
            section: Section::Services,
        })?;
    }

    Ok(())
}

/// Writes `cluster` into `attrs`, including the computed attributes.
///
/// The first failing write aborts. Attributes written before it keep their new value.
pub fn flatten(cluster: &Cluster, attrs: &mut impl ResourceData) -> Result<()> {
    let config = &cluster.config;

    if config.addon_job_timeout > 0 {
        write(attrs, ADDON_JOB_TIMEOUT, config.addon_job_timeout)?;
    }
    write_section(
        attrs,
        Section::Addons,
        (!config.addons.is_empty()).then(|| config.addons.as_str().into()),
    )?;
    write_section(
        attrs,
        Section::AddonsInclude,
        (!config.addons_include.is_empty()).then(|| {
            AttributeValue::List(
                config
                    .addons_include
                    .iter()
                    .map(|addon| addon.as_str().into())
                    .collect(),
            )
        }),
    )?;

    write_section(
        attrs,
        Section::Authentication,
        authentication::flatten(&config.authentication),
    )?;
    write_section(
        attrs,
        Section::Authorization,
        authorization::flatten(&config.authorization),
    )?;
    write_section(
        attrs,
        Section::BastionHost,
        bastion_host::flatten(&config.bastion_host),
    )?;

    let value = cloud_provider::flatten(
        &config.cloud_provider,
        attrs.get_block(Section::CloudProvider.attribute()),
    );
    write_section(attrs, Section::CloudProvider, value)?;

    if !config.cluster_name.is_empty() {
        write(attrs, CLUSTER_NAME, config.cluster_name.as_str())?;
    }
    write_section(attrs, Section::Dns, config.dns.as_ref().and_then(dns::flatten))?;
    write(attrs, flags::DIND, cluster.dind)?;
    if let Some(ignore_docker_version) = config.ignore_docker_version {
        write(attrs, IGNORE_DOCKER_VERSION, ignore_docker_version)?;
    }
    write_section(attrs, Section::Ingress, ingress::flatten(&config.ingress))?;
    if !config.kubernetes_version.is_empty() {
        write(attrs, KUBERNETES_VERSION, config.kubernetes_version.as_str())?;
    }
    write_section(
        attrs,
        Section::Monitoring,
        monitoring::flatten(&config.monitoring),
    )?;
    write_section(attrs, Section::Network, network::flatten(&config.network))?;

    if cluster.dind {
        tracing::debug!("running in Docker-in-Docker mode, skipping nodes");
    } else {
        let value = nodes::flatten(
            &config.nodes,
            &attrs.get_blocks(Section::Nodes.attribute()),
        );
        write_section(attrs, Section::Nodes, value)?;
    }

    if !config.prefix_path.is_empty() {
        write(attrs, PREFIX_PATH, config.prefix_path.as_str())?;
    }
    write_section(
        attrs,
        Section::PrivateRegistries,
        private_registries::flatten(&config.private_registries),
    )?;
    write_section(attrs, Section::Restore, restore::flatten(&config.restore))?;
    write_section(
        attrs,
        Section::RotateCertificates,
        config
            .rotate_certificates
            .as_ref()
            .and_then(rotate_certificates::flatten),
    )?;

    let value = services::flatten(
        &config.services,
        attrs.get_block(Section::Services.attribute()),
    )
    .context(FlattenSectionSnafu {
        section: Section::Services,
    })?;
    write_section(attrs, Section::Services, value)?;

    write(attrs, SSH_AGENT_AUTH, config.ssh_agent_auth)?;
    if !config.ssh_cert_path.is_empty() {
        write(attrs, SSH_CERT_PATH, config.ssh_cert_path.as_str())?;
    }
    if !config.ssh_key_path.is_empty() {
        write(attrs, SSH_KEY_PATH, config.ssh_key_path.as_str())?;
    }

    flatten_computed(cluster, attrs)?;

    write_section(
        attrs,
        Section::UpgradeStrategy,
        config
            .upgrade_strategy
            .as_ref()
            .and_then(upgrade_strategy::flatten),
    )
}

fn flatten_computed(cluster: &Cluster, attrs: &mut impl ResourceData) -> Result<()> {
    write(
        attrs,
        API_SERVER_URL,
        cluster.api_server_url().unwrap_or_default(),
    )?;

    let certificates = certificates::flatten(&cluster.certificates);
    write(attrs, CA_CRT, certificates.ca_crt)?;
    write(attrs, CLIENT_CERT, certificates.client_cert)?;
    write(attrs, CLIENT_KEY, certificates.client_key)?;
    write(attrs, CERTIFICATES, certificates.certificates)?;
    write(attrs, KUBE_ADMIN_USER, KUBE_ADMIN_CERT_NAME)?;

    write(attrs, CLUSTER_DOMAIN, cluster.cluster_domain.as_str())?;
    write(attrs, CLUSTER_CIDR, cluster.cluster_cidr.as_str())?;
    write(attrs, CLUSTER_DNS_SERVER, cluster.cluster_dns_server.as_str())?;

    write(attrs, ETCD_HOSTS, nodes::flatten_hosts(&cluster.etcd_hosts))?;
    write(
        attrs,
        CONTROL_PLANE_HOSTS,
        nodes::flatten_hosts(&cluster.control_plane_hosts),
    )?;
    write(attrs, WORKER_HOSTS, nodes::flatten_hosts(&cluster.worker_hosts))?;
    write(
        attrs,
        INACTIVE_HOSTS,
        nodes::flatten_hosts(&cluster.inactive_hosts),
    )?;

    let running_system_images = system_images::flatten(&cluster.config.system_images)
        .unwrap_or_else(|| AttributeValue::List(Vec::new()));
    write(attrs, RUNNING_SYSTEM_IMAGES, running_system_images)
}

fn write(
    attrs: &mut impl ResourceData,
    name: &'static str,
    value: impl Into<AttributeValue>,
) -> Result<()> {
    attrs
        .set(name, value.into())
        .context(WriteAttributeSnafu { name })
}

/// Writes a section the object holds a value for, as far as its write policy allows.
fn write_section(
    attrs: &mut impl ResourceData,
    section: Section,
    value: Option<AttributeValue>,
) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };

    if !section.may_write(attrs) {
        tracing::debug!(%section, "attribute is not tracked, skipping section");
        return Ok(());
    }

    write(attrs, section.attribute(), value)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use indoc::indoc;
    use rke_config::{
        CertificatePki,
        apiserver::audit::{Level, Policy},
        cluster::CA_CERT_NAME,
        config::{
            AuthnConfig, CloudProvider, DnsConfig, NetworkConfig, NodeUpgradeStrategy,
            PrivateRegistry, RotateCertificates,
        },
        nodes::{Node, Role},
        services::{AuditLog, AuditLogConfig},
    };
    use rstest::rstest;

    use super::*;
    use crate::attributes::{Attributes, Block, BlockBuilder, Schema};

    /// Fails every write of one attribute and records all others.
    struct FailingStore {
        inner: Attributes,
        fail_on: &'static str,
    }

    impl ResourceData for FailingStore {
        fn get(&self, name: &str) -> Option<&AttributeValue> {
            self.inner.get(name)
        }

        fn set(&mut self, name: &str, value: AttributeValue) -> Result<(), AttributeError> {
            if name == self.fail_on {
                return Err(AttributeError::UnknownAttribute {
                    name: name.to_owned(),
                });
            }
            self.inner.set(name, value)
        }
    }

    fn attributes(values: serde_json::Value) -> Attributes {
        Attributes::from(
            serde_json::from_value::<BTreeMap<String, AttributeValue>>(values)
                .expect("valid attribute JSON"),
        )
    }

    fn node(address: &str, roles: &[Role]) -> Node {
        Node {
            address: address.to_owned(),
            user: "ubuntu".to_owned(),
            role: roles.to_vec(),
            ..Node::default()
        }
    }

    fn full_config() -> ClusterConfig {
        let mut config = ClusterConfig {
            nodes: vec![
                Node {
                    ssh_key: "PRIVATE KEY".to_owned(),
                    hostname_override: "cp-1".to_owned(),
                    ..node("10.0.0.1", &[Role::Controlplane, Role::Etcd])
                },
                node("10.0.0.2", &[Role::Worker]),
            ],
            network: NetworkConfig {
                plugin: "canal".to_owned(),
                mtu: 1450,
                ..NetworkConfig::default()
            },
            authentication: AuthnConfig {
                strategy: "x509".to_owned(),
                sans: vec!["rke.example.com".to_owned()],
                webhook: None,
            },
            addons: "---\nkind: Namespace\n".to_owned(),
            addons_include: vec!["https://example.com/addon.yaml".to_owned()],
            ssh_key_path: "~/.ssh/id_ed25519".to_owned(),
            ignore_docker_version: Some(true),
            kubernetes_version: "v1.27.8-rancher2-1".to_owned(),
            private_registries: vec![PrivateRegistry {
                url: "registry.example.com".to_owned(),
                is_default: true,
                ..PrivateRegistry::default()
            }],
            cluster_name: "test".to_owned(),
            cloud_provider: CloudProvider {
                name: "aws".to_owned(),
                custom_cloud_provider: String::new(),
            },
            prefix_path: "/opt/rke".to_owned(),
            addon_job_timeout: 60,
            rotate_certificates: Some(RotateCertificates {
                ca_certificates: true,
                services: vec!["etcd".to_owned()],
            }),
            dns: Some(DnsConfig {
                provider: "coredns".to_owned(),
                ..DnsConfig::default()
            }),
            upgrade_strategy: Some(NodeUpgradeStrategy {
                max_unavailable_worker: "10%".to_owned(),
                drain: Some(false),
                ..NodeUpgradeStrategy::default()
            }),
            ..ClusterConfig::default()
        };
        config.services.kube_api.audit_log = Some(AuditLog {
            enabled: true,
            configuration: Some(AuditLogConfig {
                max_age: 5,
                policy: Some(Policy::with_level(Level::Metadata)),
                ..AuditLogConfig::default()
            }),
        });
        config.services.kubelet.cluster_domain = "cluster.local".to_owned();
        config
    }

    /// An attribute store in which every guarded section is already tracked.
    fn tracked_attributes() -> Attributes {
        let mut attrs = Attributes::with_schema(Schema::rke_cluster());
        let placeholder = || BlockBuilder::new().string("placeholder", "x").build();
        for section in [
            Section::CloudProvider,
            Section::Nodes,
            Section::PrivateRegistries,
            Section::RotateCertificates,
            Section::AddonsInclude,
        ] {
            attrs.insert(section.attribute(), placeholder());
        }
        attrs.insert(Section::Addons.attribute(), "placeholder");
        attrs
    }

    #[test]
    fn dind_injects_conntrack_argument_into_seeded_services() {
        let attrs = attributes(serde_json::json!({
            "dind": true,
            "cluster_yaml": indoc! {"
                services:
                  kubeproxy:
                    extra_args:
                      foo: bar
            "},
        }));

        let (document, config) = expand(&attrs).expect("attributes are valid");
        assert_eq!(
            config.services.kubeproxy.base.extra_args,
            BTreeMap::from([
                ("foo".to_owned(), "bar".to_owned()),
                (CONNTRACK_MAX_PER_CORE.to_owned(), "0".to_owned()),
            ])
        );
        assert!(document.contains("conntrack-max-per-core: '0'"), "{document}");
    }

    #[rstest]
    #[case(serde_json::json!({"dind": true}), true)]
    #[case(serde_json::json!({"dind": false}), false)]
    #[case(serde_json::json!({}), false)]
    fn conntrack_argument_follows_dind(#[case] values: serde_json::Value, #[case] injected: bool) {
        let (_, config) = expand(&attributes(values)).expect("attributes are valid");
        assert_eq!(
            config
                .services
                .kubeproxy
                .base
                .extra_args
                .contains_key(CONNTRACK_MAX_PER_CORE),
            injected
        );
    }

    #[test]
    fn attributes_are_laid_over_the_seed() {
        let attrs = attributes(serde_json::json!({
            "cluster_name": "from-attributes",
            "kubernetes_version": "",
            "cluster_yaml": indoc! {"
                cluster_name: from-seed
                kubernetes_version: v1.26.11-rancher2-1
                network:
                  plugin: flannel
            "},
            "network": [{"plugin": "canal"}],
        }));

        let (_, config) = expand(&attrs).expect("attributes are valid");
        assert_eq!(config.cluster_name, "from-attributes");
        assert_eq!(config.kubernetes_version, "v1.26.11-rancher2-1");
        assert_eq!(config.network.plugin, "canal");
    }

    #[test]
    fn malformed_seed_fails_expand() {
        let attrs = attributes(serde_json::json!({"cluster_yaml": "nodes: [unclosed"}));
        assert!(matches!(expand(&attrs), Err(Error::ParseSeed { .. })));
    }

    #[test]
    fn invalid_node_names_its_section() {
        let attrs = attributes(serde_json::json!({
            "nodes": [{"address": "10.0.0.1", "role": ["worker"]}],
        }));

        let error = expand(&attrs).expect_err("node lacks a user");
        assert!(
            matches!(
                error,
                Error::ExpandSection {
                    section: Section::Nodes,
                    ..
                }
            ),
            "{error}"
        );
    }

    #[rstest]
    #[case(vec![node("10.0.0.5", &[Role::Controlplane])], "https://10.0.0.5:6443")]
    #[case(vec![node("10.0.0.6", &[Role::Worker])], "")]
    #[case(Vec::new(), "")]
    fn api_server_url_is_computed(#[case] nodes: Vec<Node>, #[case] expected: &str) {
        let cluster = Cluster::from_config(
            ClusterConfig {
                nodes,
                ..ClusterConfig::default()
            },
            false,
        );

        let mut attrs = Attributes::with_schema(Schema::rke_cluster());
        flatten(&cluster, &mut attrs).expect("all attributes are part of the schema");
        assert_eq!(attrs.get(API_SERVER_URL), Some(&AttributeValue::from(expected)));
    }

    #[test]
    fn computed_attributes_are_written() {
        let mut cluster = Cluster::from_config(full_config(), false);
        cluster.certificates.insert(
            CA_CERT_NAME.to_owned(),
            CertificatePki {
                certificate: "ca-cert".to_owned(),
                ..CertificatePki::default()
            },
        );
        cluster.config.system_images.kubernetes = "rancher/hyperkube:v1.27.8".to_owned();

        let mut attrs = Attributes::with_schema(Schema::rke_cluster());
        flatten(&cluster, &mut attrs).expect("all attributes are part of the schema");

        assert_eq!(attrs.get_str(CA_CRT), Some("ca-cert"));
        assert_eq!(attrs.get(CLIENT_CERT), Some(&AttributeValue::from("")));
        assert_eq!(attrs.get_str(KUBE_ADMIN_USER), Some(KUBE_ADMIN_CERT_NAME));
        assert_eq!(attrs.get_str(CLUSTER_DOMAIN), Some("cluster.local"));

        let control_plane: Vec<_> = attrs
            .get_blocks(CONTROL_PLANE_HOSTS)
            .iter()
            .filter_map(|host| host.string("node_name"))
            .collect();
        assert_eq!(control_plane, ["cp-1"]);
        assert_eq!(attrs.get_blocks(WORKER_HOSTS).len(), 1);
        assert_eq!(attrs.get(INACTIVE_HOSTS), Some(&AttributeValue::List(Vec::new())));

        let images = attrs
            .get_block(RUNNING_SYSTEM_IMAGES)
            .expect("running images are written");
        assert_eq!(images.string("kubernetes"), Some("rancher/hyperkube:v1.27.8"));
        assert!(attrs.get(SYSTEM_IMAGES).is_none());
    }

    #[test]
    fn untracked_cloud_provider_is_not_written() {
        let cluster = Cluster::from_config(full_config(), false);

        let mut attrs = Attributes::with_schema(Schema::rke_cluster());
        flatten(&cluster, &mut attrs).expect("all attributes are part of the schema");
        assert!(attrs.get(Section::CloudProvider.attribute()).is_none());

        let mut attrs = tracked_attributes();
        flatten(&cluster, &mut attrs).expect("all attributes are part of the schema");
        let cloud_provider = attrs
            .get_block(Section::CloudProvider.attribute())
            .expect("tracked cloud provider is written");
        assert_eq!(cloud_provider.string("name"), Some("aws"));
    }

    #[rstest]
    #[case(Section::Nodes)]
    #[case(Section::PrivateRegistries)]
    #[case(Section::RotateCertificates)]
    #[case(Section::Addons)]
    #[case(Section::AddonsInclude)]
    fn untracked_guarded_sections_are_not_written(#[case] section: Section) {
        let cluster = Cluster::from_config(full_config(), false);

        let mut attrs = Attributes::new();
        flatten(&cluster, &mut attrs).expect("no schema attached");
        assert!(attrs.get(section.attribute()).is_none());
        assert!(attrs.get(Section::Network.attribute()).is_some());
    }

    #[test]
    fn nodes_are_not_written_in_dind_mode() {
        let cluster = Cluster::from_config(full_config(), true);

        let mut attrs = tracked_attributes();
        let before = attrs.get(Section::Nodes.attribute()).cloned();
        flatten(&cluster, &mut attrs).expect("all attributes are part of the schema");

        assert_eq!(attrs.get(Section::Nodes.attribute()).cloned(), before);
        assert_eq!(attrs.get_bool(flags::DIND), Some(true));
    }

    #[test]
    fn failed_write_aborts_without_rollback() {
        let mut config = full_config();
        config.ingress.provider = "nginx".to_owned();
        let cluster = Cluster::from_config(config, false);

        let mut attrs = FailingStore {
            inner: Attributes::new(),
            fail_on: "ingress",
        };
        let error = flatten(&cluster, &mut attrs).expect_err("ingress write fails");
        assert!(
            matches!(error, Error::WriteAttribute { name: "ingress", .. }),
            "{error}"
        );

        assert_eq!(attrs.get_str(CLUSTER_NAME), Some("test"));
        assert!(attrs.get(Section::Authentication.attribute()).is_some());
        assert!(attrs.get(Section::Network.attribute()).is_none());
        assert!(attrs.get(API_SERVER_URL).is_none());
    }

    #[test]
    fn flatten_then_expand_is_idempotent() {
        let config = full_config();
        let cluster = Cluster::from_config(config.clone(), false);

        let mut attrs = tracked_attributes();
        flatten(&cluster, &mut attrs).expect("all attributes are part of the schema");

        let (document, expanded) = expand(&attrs).expect("flattened attributes expand");
        assert_eq!(expanded, config);
        assert_eq!(
            rke_config::parse_config(&document).expect("engine can parse the document"),
            config
        );
    }

    #[test]
    fn sensitive_node_material_survives_a_refresh() {
        let config = full_config();
        let mut attrs = tracked_attributes();
        flatten(&Cluster::from_config(config.clone(), false), &mut attrs)
            .expect("all attributes are part of the schema");

        let mut reported = config.clone();
        for node in &mut reported.nodes {
            node.ssh_key.clear();
        }
        flatten(&Cluster::from_config(reported, false), &mut attrs)
            .expect("all attributes are part of the schema");

        let nodes = attrs
            .get(Section::Nodes.attribute())
            .expect("nodes are written");
        assert_eq!(Block::all(nodes)[0].string("ssh_key"), Some("PRIVATE KEY"));

        let (_, expanded) = expand(&attrs).expect("flattened attributes expand");
        assert_eq!(expanded.nodes, config.nodes);
    }
}
