use rke_config::config::MonitoringConfig;

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> MonitoringConfig {
    MonitoringConfig {
        provider: block.string("provider").unwrap_or_default().to_owned(),
        options: block.string_map("options"),
        node_selector: block.string_map("node_selector"),
    }
}

pub fn flatten(monitoring: &MonitoringConfig) -> Option<AttributeValue> {
    BlockBuilder::new()
        .string("provider", &monitoring.provider)
        .string_map("options", &monitoring.options)
        .string_map("node_selector", &monitoring.node_selector)
        .build_non_empty()
}
