use rke_config::config::IngressConfig;

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> IngressConfig {
    IngressConfig {
        provider: block.string("provider").unwrap_or_default().to_owned(),
        options: block.string_map("options"),
        node_selector: block.string_map("node_selector"),
        extra_args: block.string_map("extra_args"),
        dns_policy: block.string("dns_policy").unwrap_or_default().to_owned(),
    }
}

pub fn flatten(ingress: &IngressConfig) -> Option<AttributeValue> {
    BlockBuilder::new()
        .string("provider", &ingress.provider)
        .string_map("options", &ingress.options)
        .string_map("node_selector", &ingress.node_selector)
        .string_map("extra_args", &ingress.extra_args)
        .string("dns_policy", &ingress.dns_policy)
        .build_non_empty()
}
