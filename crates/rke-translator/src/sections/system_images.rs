use rke_config::system_images::SystemImages;

use crate::attributes::{AttributeValue, Block, BlockBuilder};

pub fn expand(block: &Block<'_>) -> SystemImages {
    let mut images = SystemImages::default();
    for (component, image) in block.fields() {
        let Some(image) = image.as_str().filter(|image| !image.is_empty()) else {
            continue;
        };

        if !images.set(component, image.to_owned()) {
            tracing::debug!(component, "ignoring image of unknown system component");
        }
    }
    images
}

/// Flattens the images. Components without an image are left out.
pub fn flatten(images: &SystemImages) -> Option<AttributeValue> {
    images
        .iter()
        .fold(BlockBuilder::new(), |block, (component, image)| {
            block.string(component, image)
        })
        .build_non_empty()
}
