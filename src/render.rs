//! Render composition and pipeline batching.
//!
//! Flows describe what they want drawn with a [`Render`]. The engine sorts the
//! pieces into one batch per pipeline (textured models, toon meshes, points) so
//! each pipeline is bound once per frame regardless of how many flows exist.

use crate::data_structures::{model::Model, model::Mesh, scene_graph::SceneNode};

/// A textured model plus the instance buffer holding its world transforms.
#[derive(Clone)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// A mesh drawn with the toon pipeline: one material, a range of instances.
#[derive(Clone)]
pub struct Toon<'a> {
    pub mesh: &'a Mesh,
    pub material: &'a wgpu::BindGroup,
    pub instance: &'a wgpu::Buffer,
    pub instances: std::ops::Range<u32>,
}

/// A point cloud: one quad per instance, positions in `positions`.
#[derive(Clone)]
pub struct Points<'a> {
    pub positions: &'a wgpu::Buffer,
    pub material: &'a wgpu::BindGroup,
    pub amount: u32,
}

/// Specifies how a flow's objects should be rendered.
///
/// - `Defaults(Vec<Instanced>)` renders textured, lit models
/// - `Toon(Vec<Toon>)` renders cel-shaded meshes
/// - `Points(Points)` renders a particle cloud
/// - `Composed(Vec<Render>)` recursively renders a composition of the above
pub enum Render<'a> {
    Defaults(Vec<Instanced<'a>>),
    Toon(Vec<Toon<'a>>),
    Points(Points<'a>),
    Composed(Vec<Render<'a>>),
}

/// Per-pipeline batches collected from all flows for one frame.
#[derive(Default)]
pub(crate) struct Batches<'a> {
    pub(crate) basics: Vec<Instanced<'a>>,
    pub(crate) toons: Vec<Toon<'a>>,
    pub(crate) points: Vec<Points<'a>>,
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::Defaults(mut vec) => batches.basics.append(&mut vec),
            Render::Toon(mut vec) => batches.toons.append(&mut vec),
            Render::Points(points) => batches.points.push(points),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(batches)),
        }
    }
}

impl<'a> From<&'a dyn SceneNode> for Render<'a> {
    fn from(sn: &'a dyn SceneNode) -> Self {
        Render::Defaults(sn.get_render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::scene_graph::ContainerNode;

    #[test]
    fn composed_renders_flatten_into_batches() {
        let empty = ContainerNode::new(1);
        let render = Render::Composed(vec![
            Render::from(&empty as &dyn SceneNode),
            Render::Composed(vec![Render::Toon(Vec::new())]),
        ]);
        let mut batches = Batches::default();
        render.set_pipelines(&mut batches);
        assert!(batches.basics.is_empty());
        assert!(batches.toons.is_empty());
        assert!(batches.points.is_empty());
    }
}
