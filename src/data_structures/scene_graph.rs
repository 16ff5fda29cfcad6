//! Scene graph and hierarchical scene organization.
//!
//! Loaded models become a tree of [`SceneNode`]s. Every node keeps pairs of
//! (local, world) transforms; [`SceneNode::update_world_transforms`] pushes a
//! parent's world transforms down the tree and [`SceneNode::write_to_buffers`]
//! uploads the resulting world transforms for drawing.

use std::ops::Range;

use log::warn;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        instance::{Instance, InstanceRaw},
        model,
    },
    render::Instanced,
};

pub trait SceneNode {
    fn get_world_transforms(&self) -> Vec<Instance>;

    fn get_local_transform(&self, idx: usize) -> Option<Instance>;

    fn set_local_transform(&mut self, idx: usize, instance: Instance);

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /**
     * Multiple instances of a parent can be passed down to multiple instances of multiple children.
     * The argument `parents_world_transform` with a matching `range` size provides control over which instances are transformed.
     */
    fn update_world_transforms(
        &mut self,
        range: Range<usize>,
        parents_world_transform: &Vec<Instance>,
    );

    /// Recompute every world transform of this subtree, treating `self` as a root.
    fn update_world_transform_all(&mut self);

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device);

    fn get_render(&self) -> Vec<Instanced<'_>>;
}

/// Shared by both node kinds: compose `parent * local` for the instances in `range`.
fn compose_world_transforms(
    instances: &mut [(Instance, Instance)],
    range: Range<usize>,
    parents_world_transform: &Vec<Instance>,
) -> Option<Vec<Instance>> {
    if parents_world_transform.len() > instances.len() {
        warn!(
            "You tried to transform with len {}, but there are only {} instances to transform.",
            parents_world_transform.len(),
            instances.len()
        );
        return None;
    }
    let len = instances.len();
    let Some(targets) = instances.get_mut(range.clone()) else {
        warn!(
            "You tried to transform range {}..{}, which is out of bounds for parent len {}.",
            range.start, range.end, len,
        );
        return None;
    };
    Some(
        targets
            .iter_mut()
            .zip(parents_world_transform.iter())
            .map(|((local, world), parent)| {
                *world = parent * &*local;
                world.clone()
            })
            .collect(),
    )
}

/// A transform-only node, e.g. a GLTF node without a mesh or the root a model hangs from.
pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    pub instances: Vec<(Instance, Instance)>,
}

impl ContainerNode {
    pub fn new(amount: usize) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Instance::default()))
            .collect();
        Self {
            instances,
            children: vec![],
        }
    }
}

impl SceneNode for ContainerNode {
    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances
            .iter()
            .map(|(_, world)| world)
            .cloned()
            .collect()
    }

    fn update_world_transforms(
        &mut self,
        range: Range<usize>,
        parents_world_transform: &Vec<Instance>,
    ) {
        let Some(world_transforms) =
            compose_world_transforms(&mut self.instances, range.clone(), parents_world_transform)
        else {
            return;
        };
        for child in self.children.iter_mut() {
            child.update_world_transforms(range.clone(), &world_transforms);
        }
    }

    fn update_world_transform_all(&mut self) {
        let range = 0..self.instances.len();
        let identities = range.clone().map(|_| Instance::default()).collect();
        self.update_world_transforms(range, &identities);
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local).cloned()
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

/// A node that draws a model once per instance.
pub struct ModelNode {
    children: Vec<Box<dyn SceneNode>>,
    instance_buffer: wgpu::Buffer,
    instances: Vec<(Instance, Instance)>,
    model: model::Model,
}

impl ModelNode {
    pub fn from_model(amount: usize, device: &wgpu::Device, model: model::Model) -> Self {
        let instances = (0..amount)
            .map(|_| (Instance::default(), Instance::default()))
            .collect::<Vec<_>>();

        let instance_data = instances
            .iter()
            .map(|(_, world)| world.to_raw())
            .collect::<Vec<_>>();

        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&instance_data),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            children: vec![],
            instance_buffer,
            instances,
            model,
        }
    }
}

impl SceneNode for ModelNode {
    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn set_local_transform(&mut self, idx: usize, instance: Instance) {
        if let Some((local, _)) = self.instances.get_mut(idx) {
            *local = instance;
        }
    }

    fn get_world_transforms(&self) -> Vec<Instance> {
        self.instances
            .iter()
            .map(|(_, world)| world)
            .cloned()
            .collect()
    }

    fn update_world_transforms(
        &mut self,
        range: Range<usize>,
        parents_world_transform: &Vec<Instance>,
    ) {
        let Some(world_transforms) =
            compose_world_transforms(&mut self.instances, range.clone(), parents_world_transform)
        else {
            return;
        };
        for child in self.children.iter_mut() {
            child.update_world_transforms(range.clone(), &world_transforms);
        }
    }

    fn update_world_transform_all(&mut self) {
        let range = 0..self.instances.len();
        let identities = range.clone().map(|_| Instance::default()).collect();
        self.update_world_transforms(range, &identities);
    }

    fn get_local_transform(&self, idx: usize) -> Option<Instance> {
        self.instances.get(idx).map(|(local, _)| local).cloned()
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        let raw_instances: Vec<InstanceRaw> = self
            .instances
            .iter()
            .map(|(_, world)| world.to_raw())
            .collect();
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&raw_instances),
        );
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue, device));
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain([Instanced {
                instance: &self.instance_buffer,
                model: &self.model,
                amount: self.instances.len(),
            }])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn translated(x: f32, y: f32, z: f32) -> Instance {
        Instance::from(Vector3::new(x, y, z))
    }

    #[test]
    fn world_transforms_propagate_through_containers() {
        let mut child = ContainerNode::new(1);
        child.add_child(Box::new(ContainerNode::new(1)));
        child.set_local_transform(0, translated(0.0, 2.0, 0.0));

        child.update_world_transforms(0..1, &vec![translated(1.0, 0.0, 0.0)]);

        assert_eq!(
            child.get_world_transforms()[0].position,
            Vector3::new(1.0, 2.0, 0.0)
        );
        assert_eq!(
            child.children[0].get_world_transforms()[0].position,
            Vector3::new(1.0, 2.0, 0.0)
        );
    }

    #[test]
    fn roots_start_from_the_identity() {
        let mut root = ContainerNode::new(1);
        root.add_child(Box::new(ContainerNode::new(1)));
        root.set_local_transform(0, translated(1.0, 0.0, 0.0));

        root.update_world_transform_all();

        assert_eq!(
            root.children[0].get_world_transforms()[0].position,
            Vector3::new(1.0, 0.0, 0.0)
        );
    }

    #[test]
    fn out_of_range_updates_are_ignored() {
        let mut node = ContainerNode::new(1);
        node.set_local_transform(0, translated(3.0, 0.0, 0.0));
        node.update_world_transforms(2..3, &vec![Instance::default()]);
        assert_eq!(node.get_world_transforms()[0], Instance::default());
    }

    #[test]
    fn setting_a_missing_instance_is_a_no_op() {
        let mut node = ContainerNode::new(1);
        node.set_local_transform(5, translated(3.0, 0.0, 0.0));
        assert_eq!(node.get_local_transform(0), Some(Instance::default()));
        assert_eq!(node.get_local_transform(5), None);
    }
}
