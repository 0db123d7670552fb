//! The cluster configuration model of the RKE bootstrap engine.
//!
//! [`ClusterConfig`] mirrors the `cluster.yml` document the engine consumes, [`Cluster`] the state
//! it reports back after bringing a cluster up and [`ExternalFlags`] the knobs which influence
//! how it runs.

use snafu::{ResultExt, Snafu};

pub mod apiserver;
pub mod cluster;
pub mod config;
pub mod flags;
pub mod nodes;
pub mod services;
pub mod system_images;

pub use cluster::{CertificatePki, Cluster, Host};
pub use config::ClusterConfig;
pub use flags::ExternalFlags;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to parse cluster configuration document"))]
    ParseConfig { source: rke_shared::yaml::Error },
}

/// Parses a hand-written `cluster.yml` document.
pub fn parse_config(text: &str) -> Result<ClusterConfig, Error> {
    rke_shared::yaml::from_document_str(text).context(ParseConfigSnafu)
}

pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

pub(crate) fn is_zero(value: &i64) -> bool {
    *value == 0
}
