//! Flatten and expand functions for the individual configuration sections.
//!
//! Every module maps one top-level section field by field: `expand` turns the section's block
//! into the typed section, `flatten` does the reverse and returns [`None`] when there is nothing
//! worth writing.
use snafu::Snafu;

use crate::attributes::AttributeError;

pub mod authentication;
pub mod authorization;
pub mod bastion_host;
pub mod certificates;
pub mod cloud_provider;
pub mod dns;
pub mod ingress;
pub mod monitoring;
pub mod network;
pub mod nodes;
pub mod private_registries;
pub mod restore;
pub mod rotate_certificates;
pub mod services;
pub mod system_images;
pub mod upgrade_strategy;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("failed to parse audit log policy as JSON"))]
    ParseAuditPolicy { source: serde_json::Error },

    #[snafu(display("failed to serialize audit log policy as JSON"))]
    SerializeAuditPolicy { source: serde_json::Error },

    #[snafu(display("failed to parse event rate limit configuration"))]
    ParseEventRateLimit { source: rke_shared::yaml::Error },

    #[snafu(display("failed to serialize event rate limit configuration"))]
    SerializeEventRateLimit { source: rke_shared::yaml::Error },

    #[snafu(display("failed to parse secrets encryption custom config"))]
    ParseEncryptionConfig { source: rke_shared::yaml::Error },

    #[snafu(display("failed to serialize secrets encryption custom config"))]
    SerializeEncryptionConfig { source: rke_shared::yaml::Error },

    #[snafu(display("invalid node at index {index}"))]
    InvalidNode {
        source: AttributeError,
        index: usize,
    },

    #[snafu(display("node at index {index} has unknown role {role:?}"))]
    UnknownNodeRole {
        source: strum::ParseError,
        index: usize,
        role: String,
    },
}
