use rke_config::config::RestoreConfig;

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> RestoreConfig {
    RestoreConfig {
        restore: block.bool("restore").unwrap_or_default(),
        snapshot_name: block.string("snapshot_name").unwrap_or_default().to_owned(),
    }
}

pub fn flatten(restore: &RestoreConfig) -> Option<AttributeValue> {
    BlockBuilder::new()
        .bool("restore", restore.restore)
        .string("snapshot_name", &restore.snapshot_name)
        .build_non_empty()
}
