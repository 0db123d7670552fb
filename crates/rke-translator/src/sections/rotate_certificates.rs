use rke_config::config::RotateCertificates;

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> RotateCertificates {
    RotateCertificates {
        ca_certificates: block.bool("ca_certificates").unwrap_or_default(),
        services: block.strings("services"),
    }
}

pub fn flatten(rotate_certificates: &RotateCertificates) -> Option<AttributeValue> {
    BlockBuilder::new()
        .bool("ca_certificates", rotate_certificates.ca_certificates)
        .strings("services", &rotate_certificates.services)
        .build_non_empty()
}
