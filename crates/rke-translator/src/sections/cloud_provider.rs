use rke_config::config::CloudProvider;

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> CloudProvider {
    CloudProvider {
        name: block.string("name").unwrap_or_default().to_owned(),
        custom_cloud_provider: block
            .string("custom_cloud_provider")
            .unwrap_or_default()
            .to_owned(),
    }
}

/// Flattens the cloud provider. The engine does not report the custom provider configuration
/// back, so it is taken from `existing` unless the object carries one.
pub fn flatten(cloud_provider: &CloudProvider, existing: Option<Block<'_>>) -> Option<AttributeValue> {
    let custom_cloud_provider = if cloud_provider.custom_cloud_provider.is_empty() {
        existing
            .and_then(|existing| existing.string("custom_cloud_provider"))
            .unwrap_or_default()
    } else {
        cloud_provider.custom_cloud_provider.as_str()
    };

    BlockBuilder::new()
        .string("name", &cloud_provider.name)
        .string("custom_cloud_provider", custom_cloud_provider)
        .build_non_empty()
}
