use rke_config::{
    Host,
    nodes::{Node, Role, Taint},
};
use snafu::ResultExt;

use super::{Error, InvalidNodeSnafu, UnknownNodeRoleSnafu};
use crate::attributes::{AttributeValue, Block, BlockBuilder};

/// Expands the node list. `address`, `user` and `role` are required on every node.
pub fn expand(blocks: &[Block<'_>]) -> Result<Vec<Node>, Error> {
    blocks
        .iter()
        .enumerate()
        .map(|(index, block)| expand_node(block, index))
        .collect()
}

fn expand_node(block: &Block<'_>, index: usize) -> Result<Node, Error> {
    let address = block
        .require_str("address")
        .context(InvalidNodeSnafu { index })?;
    let user = block.require_str("user").context(InvalidNodeSnafu { index })?;
    let role = block
        .require_strings("role")
        .context(InvalidNodeSnafu { index })?
        .into_iter()
        .map(|role| {
            role.parse::<Role>()
                .context(UnknownNodeRoleSnafu { index, role })
        })
        .collect::<Result<_, _>>()?;

    let string = |key: &str| block.string(key).unwrap_or_default().to_owned();

    Ok(Node {
        node_name: string("node_name"),
        address: address.to_owned(),
        port: string("port"),
        internal_address: string("internal_address"),
        role,
        hostname_override: string("hostname_override"),
        user: user.to_owned(),
        docker_socket: string("docker_socket"),
        ssh_agent_auth: block.bool("ssh_agent_auth").unwrap_or_default(),
        ssh_key: string("ssh_key"),
        ssh_key_path: string("ssh_key_path"),
        ssh_cert: string("ssh_cert"),
        ssh_cert_path: string("ssh_cert_path"),
        labels: block.string_map("labels"),
        taints: block
            .blocks("taints")
            .iter()
            .map(|taint| Taint {
                key: taint.string("key").unwrap_or_default().to_owned(),
                value: taint.string("value").unwrap_or_default().to_owned(),
                effect: taint.string("effect").unwrap_or_default().to_owned(),
            })
            .collect(),
    })
}

/// Flattens the node list.
///
/// SSH key material the object does not carry is taken from the `existing` node with the same
/// address.
pub fn flatten(nodes: &[Node], existing: &[Block<'_>]) -> Option<AttributeValue> {
    if nodes.is_empty() {
        return None;
    }

    let nodes = nodes
        .iter()
        .map(|node| {
            let previous = existing
                .iter()
                .find(|block| block.string("address") == Some(node.address.as_str()));
            let carried = |own: &str, key: &str| -> String {
                if own.is_empty() {
                    previous
                        .and_then(|previous| previous.string(key))
                        .unwrap_or_default()
                        .to_owned()
                } else {
                    own.to_owned()
                }
            };

            let roles: Vec<String> = node.role.iter().map(ToString::to_string).collect();
            let taints = node
                .taints
                .iter()
                .map(|taint| {
                    BlockBuilder::new()
                        .string("key", &taint.key)
                        .string("value", &taint.value)
                        .string("effect", &taint.effect)
                        .into_map()
                })
                .collect::<Vec<_>>();

            BlockBuilder::new()
                .string("node_name", &node.node_name)
                .string("address", &node.address)
                .string("port", &node.port)
                .string("internal_address", &node.internal_address)
                .strings("role", &roles)
                .string("hostname_override", &node.hostname_override)
                .string("user", &node.user)
                .string("docker_socket", &node.docker_socket)
                .bool("ssh_agent_auth", node.ssh_agent_auth)
                .string("ssh_key", &carried(&node.ssh_key, "ssh_key"))
                .string("ssh_key_path", &node.ssh_key_path)
                .string("ssh_cert", &carried(&node.ssh_cert, "ssh_cert"))
                .string("ssh_cert_path", &node.ssh_cert_path)
                .string_map("labels", &node.labels)
                .value(
                    "taints",
                    (!taints.is_empty()).then(|| AttributeValue::List(taints)),
                )
                .into_map()
        })
        .collect();

    Some(AttributeValue::List(nodes))
}

/// Flattens one of the computed host lists. Always yields a list, possibly an empty one.
pub fn flatten_hosts(hosts: &[Host]) -> AttributeValue {
    let hosts = hosts
        .iter()
        .map(|host| {
            BlockBuilder::new()
                .string("address", &host.address)
                .string("node_name", &host.node_name)
                .into_map()
        })
        .collect();

    AttributeValue::List(hosts)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;

    use super::*;
    use crate::attributes::{AttributeError, AttributeKind};

    fn node_value(fields: serde_json::Value) -> AttributeValue {
        serde_json::from_value(serde_json::json!([fields])).expect("valid attribute JSON")
    }

    #[test]
    fn nodes_survive_a_round_trip() {
        let nodes = vec![Node {
            node_name: "cp-1".to_owned(),
            address: "10.0.0.1".to_owned(),
            port: "2222".to_owned(),
            role: vec![Role::Controlplane, Role::Etcd],
            user: "ubuntu".to_owned(),
            ssh_key: "PRIVATE KEY".to_owned(),
            labels: BTreeMap::from([("zone".to_owned(), "a".to_owned())]),
            taints: vec![Taint {
                key: "dedicated".to_owned(),
                value: "etcd".to_owned(),
                effect: "NoSchedule".to_owned(),
            }],
            ..Node::default()
        }];

        let value = flatten(&nodes, &[]).expect("nodes are set");
        assert_eq!(expand(&Block::all(&value)).expect("nodes are valid"), nodes);
    }

    #[test]
    fn ssh_material_is_carried_over_by_address() {
        let existing = node_value(serde_json::json!({
            "address": "10.0.0.1",
            "user": "ubuntu",
            "role": ["worker"],
            "ssh_key": "PRIVATE KEY",
            "ssh_cert": "CERT",
        }));
        let nodes = vec![Node {
            address: "10.0.0.1".to_owned(),
            user: "ubuntu".to_owned(),
            role: vec![Role::Worker],
            ..Node::default()
        }];

        let value = flatten(&nodes, &Block::all(&existing)).expect("nodes are set");
        assert_eq!(value, existing);
    }

    #[rstest]
    #[case(
        serde_json::json!({"user": "ubuntu", "role": ["worker"]}),
        AttributeError::MissingAttribute { name: "address".to_owned() },
    )]
    #[case(
        serde_json::json!({"address": "10.0.0.1", "user": 1, "role": ["worker"]}),
        AttributeError::AttributeType {
            name: "user".to_owned(),
            expected: AttributeKind::String,
            found: AttributeKind::Int,
        },
    )]
    #[case(
        serde_json::json!({"address": "10.0.0.1", "user": "ubuntu"}),
        AttributeError::MissingAttribute { name: "role".to_owned() },
    )]
    fn required_fields_are_enforced(
        #[case] fields: serde_json::Value,
        #[case] expected: AttributeError,
    ) {
        let value = node_value(fields);
        let error = expand(&Block::all(&value)).expect_err("node is invalid");
        assert!(
            matches!(&error, Error::InvalidNode { source, index: 0 } if *source == expected),
            "{error}"
        );
    }

    #[test]
    fn unknown_roles_are_rejected() {
        let value = node_value(serde_json::json!({
            "address": "10.0.0.1",
            "user": "ubuntu",
            "role": ["master"],
        }));

        let error = expand(&Block::all(&value)).expect_err("role is unknown");
        assert!(
            matches!(&error, Error::UnknownNodeRole { role, .. } if role == "master"),
            "{error}"
        );
    }

    #[test]
    fn host_lists_are_always_written() {
        assert_eq!(flatten_hosts(&[]), AttributeValue::List(Vec::new()));

        let hosts = flatten_hosts(&[Host {
            address: "10.0.0.1".to_owned(),
            node_name: "cp-1".to_owned(),
        }]);
        let hosts = Block::all(&hosts);
        assert_eq!(hosts[0].string("node_name"), Some("cp-1"));
    }
}
