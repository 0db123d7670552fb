use rke_config::config::NetworkConfig;

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> NetworkConfig {
    NetworkConfig {
        plugin: block.string("plugin").unwrap_or_default().to_owned(),
        options: block.string_map("options"),
        mtu: block.int("mtu").unwrap_or_default(),
        node_selector: block.string_map("node_selector"),
    }
}

pub fn flatten(network: &NetworkConfig) -> Option<AttributeValue> {
    BlockBuilder::new()
        .string("plugin", &network.plugin)
        .string_map("options", &network.options)
        .int("mtu", network.mtu)
        .string_map("node_selector", &network.node_selector)
        .build_non_empty()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn expand_reads_all_fields() {
        let value = BlockBuilder::new()
            .string("plugin", "canal")
            .int("mtu", 1450)
            .string_map(
                "options",
                &BTreeMap::from([("canal_iface".to_owned(), "eth1".to_owned())]),
            )
            .build();
        let block = Block::first(&value).expect("singleton list of maps");

        let network = expand(&block);
        assert_eq!(network.plugin, "canal");
        assert_eq!(network.mtu, 1450);
        assert_eq!(network.options["canal_iface"], "eth1");
        assert!(network.node_selector.is_empty());
        assert_eq!(flatten(&network), Some(value));
    }
}
