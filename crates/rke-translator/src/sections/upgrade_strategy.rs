use rke_config::config::{NodeDrainInput, NodeUpgradeStrategy};

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> NodeUpgradeStrategy {
    NodeUpgradeStrategy {
        max_unavailable_worker: block
            .string("max_unavailable_worker")
            .unwrap_or_default()
            .to_owned(),
        max_unavailable_controlplane: block
            .string("max_unavailable_controlplane")
            .unwrap_or_default()
            .to_owned(),
        drain: block.bool("drain"),
        node_drain_input: block.block("drain_input").map(|input| NodeDrainInput {
            force: input.bool("force").unwrap_or_default(),
            ignore_daemonsets: input.bool("ignore_daemon_sets"),
            delete_local_data: input.bool("delete_local_data").unwrap_or_default(),
            grace_period: input.int("grace_period").unwrap_or_default(),
            timeout: input.int("timeout").unwrap_or_default(),
        }),
    }
}

pub fn flatten(strategy: &NodeUpgradeStrategy) -> Option<AttributeValue> {
    let drain_input = strategy.node_drain_input.as_ref().and_then(|input| {
        BlockBuilder::new()
            .bool("force", input.force)
            .optional_bool("ignore_daemon_sets", input.ignore_daemonsets)
            .bool("delete_local_data", input.delete_local_data)
            .int("grace_period", input.grace_period)
            .int("timeout", input.timeout)
            .build_non_empty()
    });

    BlockBuilder::new()
        .string("max_unavailable_worker", &strategy.max_unavailable_worker)
        .string(
            "max_unavailable_controlplane",
            &strategy.max_unavailable_controlplane,
        )
        .optional_bool("drain", strategy.drain)
        .value("drain_input", drain_input)
        .build_non_empty()
}
