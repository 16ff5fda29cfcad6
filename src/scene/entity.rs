//! Scene entities: poses, the loadable model slots and the section meshes.

use cgmath::{Euler, Quaternion, Rad, Vector3};

use crate::{
    config::AssetConfig,
    data_structures::{instance::Instance, scene_graph::SceneNode},
};

/// Position, Euler rotation and scale of an entity.
///
/// The rotation is kept as XYZ Euler angles in radians so per-frame
/// increments and tweens can add to each axis independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Pose {
    pub fn new(position: Vector3<f32>, scale: f32) -> Self {
        Self {
            position,
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(scale, scale, scale),
        }
    }

    pub fn to_instance(&self) -> Instance {
        let euler = Euler::new(
            Rad(self.rotation.x),
            Rad(self.rotation.y),
            Rad(self.rotation.z),
        );
        Instance {
            position: self.position,
            rotation: Quaternion::from(euler),
            scale: self.scale,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 0.0), 1.0)
    }
}

/// Names the loadable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Bally,
    Planet,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Bally, Slot::Planet];

    /// Pose applied once the model has been loaded.
    pub fn initial_pose(self) -> Pose {
        match self {
            Slot::Bally => Pose::new(Vector3::new(1.0, 0.0, 0.0), 0.1),
            Slot::Planet => Pose::new(Vector3::new(0.0, 1.0, -3.0), 0.03),
        }
    }

    pub fn path(self, assets: &AssetConfig) -> &str {
        match self {
            Slot::Bally => &assets.bally,
            Slot::Planet => &assets.planet,
        }
    }
}

pub struct LoadedEntity {
    pub node: Box<dyn SceneNode>,
    pub pose: Pose,
}

impl LoadedEntity {
    /// Push the pose into the root of the node and recompute its world transforms.
    pub fn apply_pose(&mut self) {
        self.node.set_local_transform(0, self.pose.to_instance());
        self.node.update_world_transform_all();
    }

    pub fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.node.write_to_buffers(queue, device);
    }
}

/// An entity that appears once its asynchronous load resolves.
///
/// Empty until filled; once filled it is never replaced.
#[derive(Default)]
pub struct EntitySlot(Option<LoadedEntity>);

impl EntitySlot {
    /// Fill the slot. Returns `false` (and drops `node`) if it is already filled.
    pub fn fill(&mut self, node: Box<dyn SceneNode>, pose: Pose) -> bool {
        if self.0.is_some() {
            return false;
        }
        let mut entity = LoadedEntity { node, pose };
        entity.apply_pose();
        self.0 = Some(entity);
        true
    }

    pub fn is_loaded(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self) -> Option<&LoadedEntity> {
        self.0.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut LoadedEntity> {
        self.0.as_mut()
    }
}

#[derive(Default)]
pub struct Entities {
    pub bally: EntitySlot,
    pub planet: EntitySlot,
}

impl Entities {
    pub fn slot_mut(&mut self, slot: Slot) -> &mut EntitySlot {
        match slot {
            Slot::Bally => &mut self.bally,
            Slot::Planet => &mut self.planet,
        }
    }

    /// Handle the outcome of a load: fill the slot on success, log on failure.
    ///
    /// Returns whether the slot was filled by this call.
    pub fn resolve(&mut self, slot: Slot, result: anyhow::Result<Box<dyn SceneNode>>) -> bool {
        match result {
            Ok(node) => {
                let filled = self.slot_mut(slot).fill(node, slot.initial_pose());
                if filled {
                    log::info!("{slot:?} is loaded");
                } else {
                    log::warn!("{slot:?} was loaded twice, keeping the first one");
                }
                filled
            }
            Err(e) => {
                log::error!("Cannot load {slot:?}, it stays hidden: {e:#}");
                false
            }
        }
    }

    pub fn loaded(&self) -> impl Iterator<Item = &LoadedEntity> {
        [&self.bally, &self.planet]
            .into_iter()
            .filter_map(EntitySlot::get)
    }

    pub fn loaded_mut(&mut self) -> impl Iterator<Item = &mut LoadedEntity> {
        [&mut self.bally, &mut self.planet]
            .into_iter()
            .filter_map(EntitySlot::get_mut)
    }
}

/// Radius and (x, y) position of each section mesh.
pub const SECTION_LAYOUT: [(f32, [f32; 2]); 4] = [
    (0.5, [2.0, 0.0]),
    (0.3, [0.0, 1.0]),
    (0.2, [-2.0, 0.5]),
    (0.5, [-2.5, -0.5]),
];

/// Starting poses of the section meshes, in section order.
pub fn section_poses() -> Vec<Pose> {
    SECTION_LAYOUT
        .iter()
        .map(|(_, [x, y])| Pose::new(Vector3::new(*x, *y, 0.0), 1.0))
        .collect()
}
