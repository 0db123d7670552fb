use rke_config::config::PrivateRegistry;

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(blocks: &[Block<'_>]) -> Vec<PrivateRegistry> {
    blocks
        .iter()
        .map(|block| PrivateRegistry {
            url: block.string("url").unwrap_or_default().to_owned(),
            user: block.string("user").unwrap_or_default().to_owned(),
            password: block.string("password").unwrap_or_default().to_owned(),
            is_default: block.bool("is_default").unwrap_or_default(),
        })
        .collect()
}

pub fn flatten(registries: &[PrivateRegistry]) -> Option<AttributeValue> {
    if registries.is_empty() {
        return None;
    }

    let registries = registries
        .iter()
        .map(|registry| {
            BlockBuilder::new()
                .string("url", &registry.url)
                .string("user", &registry.user)
                .string("password", &registry.password)
                .bool("is_default", registry.is_default)
                .into_map()
        })
        .collect();

    Some(AttributeValue::List(registries))
}
