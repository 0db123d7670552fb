//! Translates the flat attributes of the `rke_cluster` resource into the RKE cluster
//! configuration and back.
//!
//! - [`cluster::expand`] builds the [`ClusterConfig`](rke_config::ClusterConfig) from the
//!   attributes and encodes the document handed to the engine, see [`patch`].
//! - [`cluster::flatten`] writes the [`Cluster`](rke_config::Cluster) state reported by the engine
//!   back into the attributes, honouring the [`presence`] rules.
//! - [`flags`] derives the engine's [`ExternalFlags`](rke_config::ExternalFlags).
//!
//! Attributes are only reached through [`ResourceData`](attributes::ResourceData).
pub mod attributes;
pub mod cluster;
pub mod flags;
pub mod patch;
pub mod presence;
pub mod sections;

pub use cluster::{expand, flatten};
pub use flags::{expand_flags, flatten_flags};
