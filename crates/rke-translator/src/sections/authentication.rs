use rke_config::config::{AuthWebhookConfig, AuthnConfig};

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> AuthnConfig {
    AuthnConfig {
        strategy: block.string("strategy").unwrap_or_default().to_owned(),
        sans: block.strings("sans"),
        webhook: block.block("webhook").map(|webhook| AuthWebhookConfig {
            config_file: webhook.string("config_file").unwrap_or_default().to_owned(),
            cache_timeout: webhook.string("cache_timeout").unwrap_or_default().to_owned(),
        }),
    }
}

pub fn flatten(authentication: &AuthnConfig) -> Option<AttributeValue> {
    let webhook = authentication.webhook.as_ref().map(|webhook| {
        BlockBuilder::new()
            .string("config_file", &webhook.config_file)
            .string("cache_timeout", &webhook.cache_timeout)
            .build()
    });

    BlockBuilder::new()
        .string("strategy", &authentication.strategy)
        .strings("sans", &authentication.sans)
        .value("webhook", webhook)
        .build_non_empty()
}
