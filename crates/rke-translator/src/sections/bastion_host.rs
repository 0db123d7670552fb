use rke_config::config::BastionHost;

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> BastionHost {
    let string = |key: &str| block.string(key).unwrap_or_default().to_owned();

    BastionHost {
        address: string("address"),
        port: string("port"),
        user: string("user"),
        ssh_agent_auth: block.bool("ssh_agent_auth").unwrap_or_default(),
        ssh_key: string("ssh_key"),
        ssh_key_path: string("ssh_key_path"),
        ssh_cert: string("ssh_cert"),
        ssh_cert_path: string("ssh_cert_path"),
    }
}

pub fn flatten(bastion_host: &BastionHost) -> Option<AttributeValue> {
    BlockBuilder::new()
        .string("address", &bastion_host.address)
        .string("port", &bastion_host.port)
        .string("user", &bastion_host.user)
        .bool("ssh_agent_auth", bastion_host.ssh_agent_auth)
        .string("ssh_key", &bastion_host.ssh_key)
        .string("ssh_key_path", &bastion_host.ssh_key_path)
        .string("ssh_cert", &bastion_host.ssh_cert)
        .string("ssh_cert_path", &bastion_host.ssh_cert_path)
        .build_non_empty()
}
