//! The `services` section.
//!
//! The three kube-api substructures typed after upstream apiserver types are kept as strings in
//! the attributes: the audit policy as JSON, the event rate limit configuration and the secrets
//! encryption custom config as YAML documents.
use rke_config::{
    apiserver::{audit, encryption::EncryptionConfiguration, event_rate_limit},
    services::{
        AuditLog, AuditLogConfig, BackupConfig, BaseService, EtcdService, EventRateLimit,
        KubeApiService, KubeControllerService, KubeletService, KubeproxyService, S3BackupConfig,
        SchedulerService, SecretsEncryptionConfig, Services,
    },
};
use rke_shared::yaml::{self, SerializeOptions};
use serde::Serialize;
use snafu::ResultExt;

use super::{
    Error, ParseAuditPolicySnafu, ParseEncryptionConfigSnafu, ParseEventRateLimitSnafu,
    SerializeAuditPolicySnafu, SerializeEncryptionConfigSnafu, SerializeEventRateLimitSnafu,
};
use crate::attributes::{AttributeValue, Block, BlockBuilder};

type Result<T, E = Error> = std::result::Result<T, E>;

pub fn expand(block: &Block<'_>) -> Result<Services> {
    Ok(Services {
        etcd: block
            .block("etcd")
            .map(|etcd| expand_etcd(&etcd))
            .unwrap_or_default(),
        kube_api: block
            .block("kube_api")
            .map(|kube_api| expand_kube_api(&kube_api))
            .transpose()?
            .unwrap_or_default(),
        kube_controller: block
            .block("kube_controller")
            .map(|kube_controller| KubeControllerService {
                base: expand_base(&kube_controller),
                cluster_cidr: owned(kube_controller.string("cluster_cidr")),
                service_cluster_ip_range: owned(
                    kube_controller.string("service_cluster_ip_range"),
                ),
            })
            .unwrap_or_default(),
        scheduler: block
            .block("scheduler")
            .map(|scheduler| SchedulerService {
                base: expand_base(&scheduler),
            })
            .unwrap_or_default(),
        kubelet: block
            .block("kubelet")
            .map(|kubelet| KubeletService {
                base: expand_base(&kubelet),
                cluster_domain: owned(kubelet.string("cluster_domain")),
                infra_container_image: owned(kubelet.string("infra_container_image")),
                cluster_dns_server: owned(kubelet.string("cluster_dns_server")),
                fail_swap_on: kubelet.bool("fail_swap_on").unwrap_or_default(),
                generate_serving_certificate: kubelet
                    .bool("generate_serving_certificate")
                    .unwrap_or_default(),
            })
            .unwrap_or_default(),
        kubeproxy: block
            .block("kubeproxy")
            .map(|kubeproxy| KubeproxyService {
                base: expand_base(&kubeproxy),
            })
            .unwrap_or_default(),
    })
}

/// Flattens the services.
///
/// `existing` is the current `services` attribute. Its secrets encryption custom config text is
/// kept as long as it still describes the object's configuration.
pub fn flatten(services: &Services, existing: Option<Block<'_>>) -> Result<Option<AttributeValue>> {
    let kube_api = flatten_kube_api(&services.kube_api, existing_custom_config(existing))?;

    let kube_controller = flatten_base(&services.kube_controller.base)
        .string("cluster_cidr", &services.kube_controller.cluster_cidr)
        .string(
            "service_cluster_ip_range",
            &services.kube_controller.service_cluster_ip_range,
        )
        .build_non_empty();

    let kubelet = &services.kubelet;
    let kubelet = flatten_base(&kubelet.base)
        .string("cluster_domain", &kubelet.cluster_domain)
        .string("infra_container_image", &kubelet.infra_container_image)
        .string("cluster_dns_server", &kubelet.cluster_dns_server)
        .bool("fail_swap_on", kubelet.fail_swap_on)
        .bool(
            "generate_serving_certificate",
            kubelet.generate_serving_certificate,
        )
        .build_non_empty();

    Ok(BlockBuilder::new()
        .value("etcd", flatten_etcd(&services.etcd))
        .value("kube_api", kube_api)
        .value("kube_controller", kube_controller)
        .value(
            "scheduler",
            flatten_base(&services.scheduler.base).build_non_empty(),
        )
        .value("kubelet", kubelet)
        .value(
            "kubeproxy",
            flatten_base(&services.kubeproxy.base).build_non_empty(),
        )
        .build_non_empty())
}

/// The secrets encryption custom config text of a `services` attribute, if it holds one.
pub fn existing_custom_config<'a>(services: Option<Block<'a>>) -> Option<&'a str> {
    services?
        .block("kube_api")?
        .block("secrets_encryption_config")?
        .string("custom_config")
}

/// Parses the secrets encryption custom config the way users write it.
pub fn parse_encryption_config(text: &str) -> Result<EncryptionConfiguration> {
    yaml::from_document_str(text).context(ParseEncryptionConfigSnafu)
}

fn owned(value: Option<&str>) -> String {
    value.unwrap_or_default().to_owned()
}

/// Serializes a user facing YAML string, with one-of members written as single-key mappings.
fn user_document<T: Serialize>(value: &T) -> Result<String, yaml::Error> {
    yaml::to_document_string_with(
        value,
        SerializeOptions {
            singleton_map: true,
            ..SerializeOptions::default()
        },
    )
}

fn expand_base(block: &Block<'_>) -> BaseService {
    BaseService {
        image: owned(block.string("image")),
        extra_args: block.string_map("extra_args"),
        extra_binds: block.strings("extra_binds"),
        extra_env: block.strings("extra_env"),
    }
}

fn flatten_base(base: &BaseService) -> BlockBuilder {
    BlockBuilder::new()
        .string("image", &base.image)
        .string_map("extra_args", &base.extra_args)
        .strings("extra_binds", &base.extra_binds)
        .strings("extra_env", &base.extra_env)
}

fn expand_etcd(block: &Block<'_>) -> EtcdService {
    EtcdService {
        base: expand_base(block),
        external_urls: block.strings("external_urls"),
        ca_cert: owned(block.string("ca_cert")),
        cert: owned(block.string("cert")),
        key: owned(block.string("key")),
        path: owned(block.string("path")),
        uid: block.int("uid").unwrap_or_default(),
        gid: block.int("gid").unwrap_or_default(),
        snapshot: block.bool("snapshot"),
        retention: owned(block.string("retention")),
        creation: owned(block.string("creation")),
        backup_config: block.block("backup_config").map(|backup| BackupConfig {
            enabled: backup.bool("enabled"),
            interval_hours: backup.int("interval_hours").unwrap_or_default(),
            retention: backup.int("retention").unwrap_or_default(),
            safe_timestamp: backup.bool("safe_timestamp").unwrap_or_default(),
            s3_backup_config: backup.block("s3_backup_config").map(|s3| S3BackupConfig {
                access_key: owned(s3.string("access_key")),
                secret_key: owned(s3.string("secret_key")),
                bucket_name: owned(s3.string("bucket_name")),
                region: owned(s3.string("region")),
                endpoint: owned(s3.string("endpoint")),
                custom_ca: owned(s3.string("custom_ca")),
                folder: owned(s3.string("folder")),
            }),
        }),
    }
}

fn flatten_etcd(etcd: &EtcdService) -> Option<AttributeValue> {
    let backup_config = etcd.backup_config.as_ref().and_then(|backup| {
        let s3_backup_config = backup.s3_backup_config.as_ref().and_then(|s3| {
            BlockBuilder::new()
                .string("access_key", &s3.access_key)
                .string("secret_key", &s3.secret_key)
                .string("bucket_name", &s3.bucket_name)
                .string("region", &s3.region)
                .string("endpoint", &s3.endpoint)
                .string("custom_ca", &s3.custom_ca)
                .string("folder", &s3.folder)
                .build_non_empty()
        });

        BlockBuilder::new()
            .optional_bool("enabled", backup.enabled)
            .int("interval_hours", backup.interval_hours)
            .int("retention", backup.retention)
            .bool("safe_timestamp", backup.safe_timestamp)
            .value("s3_backup_config", s3_backup_config)
            .build_non_empty()
    });

    flatten_base(&etcd.base)
        .strings("external_urls", &etcd.external_urls)
        .string("ca_cert", &etcd.ca_cert)
        .string("cert", &etcd.cert)
        .string("key", &etcd.key)
        .string("path", &etcd.path)
        .int("uid", etcd.uid)
        .int("gid", etcd.gid)
        .optional_bool("snapshot", etcd.snapshot)
        .string("retention", &etcd.retention)
        .string("creation", &etcd.creation)
        .value("backup_config", backup_config)
        .build_non_empty()
}

fn expand_kube_api(block: &Block<'_>) -> Result<KubeApiService> {
    let secrets_encryption_config = block
        .block("secrets_encryption_config")
        .map(|secrets| -> Result<_> {
            Ok(SecretsEncryptionConfig {
                enabled: secrets.bool("enabled").unwrap_or_default(),
                custom_config: secrets
                    .string("custom_config")
                    .map(parse_encryption_config)
                    .transpose()?,
            })
        })
        .transpose()?;

    let audit_log = block
        .block("audit_log")
        .map(|audit_log| -> Result<_> {
            Ok(AuditLog {
                enabled: audit_log.bool("enabled").unwrap_or_default(),
                configuration: audit_log
                    .block("configuration")
                    .map(|configuration| expand_audit_log_config(&configuration))
                    .transpose()?,
            })
        })
        .transpose()?;

    let event_rate_limit = block
        .block("event_rate_limit")
        .map(|rate_limit| -> Result<_> {
            Ok(EventRateLimit {
                enabled: rate_limit.bool("enabled").unwrap_or_default(),
                configuration: rate_limit
                    .string("configuration")
                    .map(|text| {
                        yaml::from_document_str::<event_rate_limit::Configuration>(text)
                            .context(ParseEventRateLimitSnafu)
                    })
                    .transpose()?,
            })
        })
        .transpose()?;

    Ok(KubeApiService {
        base: expand_base(block),
        service_cluster_ip_range: owned(block.string("service_cluster_ip_range")),
        service_node_port_range: owned(block.string("service_node_port_range")),
        pod_security_policy: block.bool("pod_security_policy").unwrap_or_default(),
        always_pull_images: block.bool("always_pull_images").unwrap_or_default(),
        secrets_encryption_config,
        audit_log,
        event_rate_limit,
    })
}

fn expand_audit_log_config(block: &Block<'_>) -> Result<AuditLogConfig> {
    Ok(AuditLogConfig {
        max_age: block.int("max_age").unwrap_or_default(),
        max_backup: block.int("max_backup").unwrap_or_default(),
        max_size: block.int("max_size").unwrap_or_default(),
        path: owned(block.string("path")),
        format: owned(block.string("format")),
        policy: block
            .string("policy")
            .map(|policy| serde_json::from_str::<audit::Policy>(policy))
            .transpose()
            .context(ParseAuditPolicySnafu)?,
    })
}

fn flatten_kube_api(
    kube_api: &KubeApiService,
    existing_custom_config: Option<&str>,
) -> Result<Option<AttributeValue>> {
    // Present substructures are written with their `enabled` flag even if it is off, so they
    // expand to `Some` again.
    let secrets_encryption_config = kube_api
        .secrets_encryption_config
        .as_ref()
        .map(|secrets| -> Result<_> {
            let custom_config = secrets
                .custom_config
                .as_ref()
                .map(|custom_config| custom_config_text(custom_config, existing_custom_config))
                .transpose()?;

            Ok(BlockBuilder::new()
                .value("enabled", Some(secrets.enabled.into()))
                .value("custom_config", custom_config.map(AttributeValue::from))
                .build())
        })
        .transpose()?;

    let audit_log = kube_api
        .audit_log
        .as_ref()
        .map(|audit_log| -> Result<_> {
            let configuration = audit_log
                .configuration
                .as_ref()
                .map(flatten_audit_log_config)
                .transpose()?;

            Ok(BlockBuilder::new()
                .value("enabled", Some(audit_log.enabled.into()))
                .value("configuration", configuration)
                .build())
        })
        .transpose()?;

    let event_rate_limit = kube_api
        .event_rate_limit
        .as_ref()
        .map(|rate_limit| -> Result<_> {
            let configuration = rate_limit
                .configuration
                .as_ref()
                .map(|configuration| {
                    user_document(configuration).context(SerializeEventRateLimitSnafu)
                })
                .transpose()?;

            Ok(BlockBuilder::new()
                .value("enabled", Some(rate_limit.enabled.into()))
                .value("configuration", configuration.map(AttributeValue::from))
                .build())
        })
        .transpose()?;

    Ok(flatten_base(&kube_api.base)
        .string("service_cluster_ip_range", &kube_api.service_cluster_ip_range)
        .string("service_node_port_range", &kube_api.service_node_port_range)
        .bool("pod_security_policy", kube_api.pod_security_policy)
        .bool("always_pull_images", kube_api.always_pull_images)
        .value("secrets_encryption_config", secrets_encryption_config)
        .value("audit_log", audit_log)
        .value("event_rate_limit", event_rate_limit)
        .build_non_empty())
}

fn flatten_audit_log_config(configuration: &AuditLogConfig) -> Result<AttributeValue> {
    let policy = configuration
        .policy
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .context(SerializeAuditPolicySnafu)?;

    Ok(BlockBuilder::new()
        .int("max_age", configuration.max_age)
        .int("max_backup", configuration.max_backup)
        .int("max_size", configuration.max_size)
        .string("path", &configuration.path)
        .string("format", &configuration.format)
        .value("policy", policy.map(AttributeValue::from))
        .build())
}

/// The text written for a custom config. The existing text wins while it parses to the same
/// configuration, so user formatting survives a refresh.
fn custom_config_text(
    custom_config: &EncryptionConfiguration,
    existing: Option<&str>,
) -> Result<String> {
    if let Some(existing) = existing {
        match parse_encryption_config(existing) {
            Ok(parsed) if parsed == *custom_config => return Ok(existing.to_owned()),
            Ok(_) => tracing::debug!("secrets encryption custom config changed, rewriting it"),
            Err(error) => tracing::debug!(
                error = &error as &dyn std::error::Error,
                "existing secrets encryption custom config does not parse, rewriting it"
            ),
        }
    }

    user_document(custom_config).context(SerializeEncryptionConfigSnafu)
}
