//! Produces the cluster document handed to the bootstrap engine.
//!
//! The audit policy, the event rate limit configuration and the secrets encryption custom config
//! are upstream apiserver types whose only normative encoding is JSON. Encoded through the primary
//! YAML path their one-of members come out as YAML tags (`!aescbc`), which the engine cannot read.
//! Each of them is therefore encoded again through the JSON bridge and the resulting fragment
//! replaces the defective node in the document tree.
use rke_config::ClusterConfig;
use rke_shared::yaml;
use serde::Serialize;
use serde_yaml::Value;
use snafu::{ResultExt, Snafu};
use strum::Display;

use crate::{
    attributes::ResourceData,
    presence::Section,
    sections::{self, services},
};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to bridge the {fragment} fragment"))]
    BridgeFragment {
        source: yaml::Error,
        fragment: Fragment,
    },

    #[snafu(display("failed to read the secrets encryption custom config attribute"))]
    ReadCustomConfig { source: sections::Error },

    #[snafu(display("failed to encode the cluster document"))]
    EncodeDocument { source: yaml::Error },

    #[snafu(display("failed to decode the cluster document into a tree"))]
    DecodeDocument { source: yaml::Error },

    #[snafu(display("failed to encode the patched cluster document"))]
    EncodePatchedDocument { source: yaml::Error },
}

/// A substructure which has to go through the JSON bridge.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
pub enum Fragment {
    AuditLog,
    EventRateLimit,
    SecretsEncryptionConfig,
}

/// Path of the kube-api service in the cluster document.
const KUBE_API: [&str; 2] = ["services", "kube-api"];

impl Fragment {
    /// The mapping below the kube-api service the fragment is spliced into, and its key there.
    const fn splice_point(self) -> (&'static [&'static str], &'static str) {
        match self {
            Self::AuditLog => (&["audit_log", "configuration"], "policy"),
            Self::EventRateLimit => (&["event_rate_limit"], "configuration"),
            Self::SecretsEncryptionConfig => (&["secrets_encryption_config"], "custom_config"),
        }
    }
}

/// Encodes `config` into the cluster document, with every present bridged substructure spliced
/// in.
///
/// Without any of the substructures the primary encoding is returned as is.
pub fn patch(config: &ClusterConfig, attrs: &impl ResourceData) -> Result<String> {
    let fragments = corrected_fragments(config, attrs)?;
    let document = yaml::to_document_string(config).context(EncodeDocumentSnafu)?;

    if fragments.is_empty() {
        return Ok(document);
    }

    let mut tree = yaml::to_tree(&document).context(DecodeDocumentSnafu)?;
    for (fragment, value) in fragments {
        splice(&mut tree, fragment, value);
    }

    yaml::tree_to_string(&tree).context(EncodePatchedDocumentSnafu)
}

fn corrected_fragments(
    config: &ClusterConfig,
    attrs: &impl ResourceData,
) -> Result<Vec<(Fragment, Value)>> {
    let kube_api = &config.services.kube_api;
    let mut fragments = Vec::new();

    let policy = kube_api
        .audit_log
        .as_ref()
        .and_then(|audit_log| audit_log.configuration.as_ref())
        .and_then(|configuration| configuration.policy.as_ref());
    if let Some(policy) = policy {
        fragments.push((Fragment::AuditLog, bridge(Fragment::AuditLog, policy)?));
    }

    let rate_limit = kube_api
        .event_rate_limit
        .as_ref()
        .and_then(|event_rate_limit| event_rate_limit.configuration.as_ref());
    if let Some(rate_limit) = rate_limit {
        fragments.push((
            Fragment::EventRateLimit,
            bridge(Fragment::EventRateLimit, rate_limit)?,
        ));
    }

    let custom_config = kube_api
        .secrets_encryption_config
        .as_ref()
        .and_then(|secrets| secrets.custom_config.as_ref());
    if let Some(custom_config) = custom_config {
        // The attribute text is what the user wrote, so it takes precedence over the object.
        let existing =
            services::existing_custom_config(attrs.get_block(Section::Services.attribute()));
        let value = match existing {
            Some(text) => {
                let parsed = services::parse_encryption_config(text)
                    .context(ReadCustomConfigSnafu)?;
                bridge(Fragment::SecretsEncryptionConfig, &parsed)?
            }
            None => bridge(Fragment::SecretsEncryptionConfig, custom_config)?,
        };
        fragments.push((Fragment::SecretsEncryptionConfig, value));
    }

    Ok(fragments)
}

fn bridge<T: Serialize>(fragment: Fragment, value: &T) -> Result<Value> {
    yaml::bridge_tree(value).context(BridgeFragmentSnafu { fragment })
}

/// Replaces the node of `fragment` in `tree`. A missing splice point is skipped.
fn splice(tree: &mut Value, fragment: Fragment, value: Value) {
    let (parent, key) = fragment.splice_point();
    let path: Vec<&str> = KUBE_API.iter().chain(parent).copied().collect();

    match yaml::mapping_at_mut(tree, &path) {
        Some(mapping) => {
            mapping.insert(Value::from(key), value);
            tracing::debug!(%fragment, "spliced corrected fragment");
        }
        None => tracing::debug!(
            %fragment,
            path = %path.join("."),
            "splice point is missing, skipping fragment"
        ),
    }
}
