use rke_config::config::AuthzConfig;

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> AuthzConfig {
    AuthzConfig {
        mode: block.string("mode").unwrap_or_default().to_owned(),
        options: block.string_map("options"),
    }
}

pub fn flatten(authorization: &AuthzConfig) -> Option<AttributeValue> {
    BlockBuilder::new()
        .string("mode", &authorization.mode)
        .string_map("options", &authorization.options)
        .build_non_empty()
}
