use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::is_false;

/// Roles a node can take in the cluster.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Controlplane,
    Etcd,
    Worker,
}

/// A host the engine connects to over SSH.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Node {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub node_name: String,

    pub address: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub port: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub internal_address: String,

    pub role: Vec<Role>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub hostname_override: String,

    pub user: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub docker_socket: String,

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

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub taints: Vec<Taint>,
}

impl Node {
    pub fn has_role(&self, role: Role) -> bool {
        self.role.contains(&role)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Taint {
    pub key: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,

    pub effect: String,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("controlplane", Role::Controlplane)]
    #[case("etcd", Role::Etcd)]
    #[case("worker", Role::Worker)]
    fn role_parses_from_lowercase_names(#[case] input: &str, #[case] expected: Role) {
        assert_eq!(input.parse::<Role>().expect("valid role"), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test]
    fn role_rejects_unknown_names() {
        assert!("master".parse::<Role>().is_err());
    }
}
