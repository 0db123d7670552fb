use rke_config::config::{DnsConfig, Nodelocal};

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> DnsConfig {
    DnsConfig {
        provider: block.string("provider").unwrap_or_default().to_owned(),
        upstream_nameservers: block.strings("upstream_nameservers"),
        reverse_cidrs: block.strings("reverse_cidrs"),
        node_selector: block.string_map("node_selector"),
        nodelocal: block.block("nodelocal").map(|nodelocal| Nodelocal {
            ip_address: nodelocal.string("ip_address").unwrap_or_default().to_owned(),
            node_selector: nodelocal.string_map("node_selector"),
        }),
    }
}

pub fn flatten(dns: &DnsConfig) -> Option<AttributeValue> {
    let nodelocal = dns.nodelocal.as_ref().and_then(|nodelocal| {
        BlockBuilder::new()
            .string("ip_address", &nodelocal.ip_address)
            .string_map("node_selector", &nodelocal.node_selector)
            .build_non_empty()
    });

    BlockBuilder::new()
        .string("provider", &dns.provider)
        .strings("upstream_nameservers", &dns.upstream_nameservers)
        .strings("reverse_cidrs", &dns.reverse_cidrs)
        .string_map("node_selector", &dns.node_selector)
        .value("nodelocal", nodelocal)
        .build_non_empty()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn nodelocal_survives_a_round_trip() {
        let dns = DnsConfig {
            provider: "coredns".to_owned(),
            upstream_nameservers: vec!["1.1.1.1".to_owned(), "8.8.4.4".to_owned()],
            reverse_cidrs: Vec::new(),
            node_selector: BTreeMap::from([("app".to_owned(), "dns".to_owned())]),
            nodelocal: Some(Nodelocal {
                ip_address: "169.254.20.10".to_owned(),
                node_selector: BTreeMap::new(),
            }),
        };

        let value = flatten(&dns).expect("section is not empty");
        let block = Block::first(&value).expect("singleton list of maps");
        assert_eq!(expand(&block), dns);
    }
}
