//! Configuration types of the Kubernetes API server, as referenced from the kube-api service.
//!
//! These types follow the Kubernetes API conventions: camelCase keys and one-of members modeled
//! as externally tagged enums. Only their JSON encoding is normative. Encoding them as part of a
//! whole cluster document through `serde_yaml` renders the one-of members as YAML tags, which the
//! API server rejects, so the translator re-encodes them through the JSON bridge before they end
//! up in a document.

pub mod audit;
pub mod encryption;
pub mod event_rate_limit;
