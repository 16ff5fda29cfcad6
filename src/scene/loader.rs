//! Asynchronous entity loads, delivered back to the scene as events.

use std::fmt::Debug;

use anyhow::Context;

use crate::{
    data_structures::scene_graph::SceneNode, resources::load_model_gltf, scene::entity::Slot,
};

/// Events the scene receives from its own futures.
pub enum SceneEvent {
    Loaded {
        slot: Slot,
        result: anyhow::Result<Box<dyn SceneNode>>,
    },
}

impl Debug for SceneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loaded { slot, result } => f
                .debug_struct("Loaded")
                .field("slot", slot)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

/// Load the model for `slot`. The future always resolves to an event; a
/// failed load carries the error instead of a node.
pub fn load_entity(
    slot: Slot,
    path: String,
    device: wgpu::Device,
    queue: wgpu::Queue,
) -> Box<dyn Future<Output = SceneEvent>> {
    Box::new(async move {
        log::info!("Loading {slot:?} from {path}");
        let result = load_model_gltf(&path, &device, &queue)
            .await
            .with_context(|| format!("Failed to load {slot:?} from {path}"));
        SceneEvent::Loaded { slot, result }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_the_node() {
        let event = SceneEvent::Loaded {
            slot: Slot::Planet,
            result: Err(anyhow::anyhow!("gone")),
        };
        assert_eq!(
            format!("{event:?}"),
            "Loaded { slot: Planet, ok: false }"
        );
    }
}
