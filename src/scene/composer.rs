//! GPU side of the scene: section meshes, their toon materials, the particle
//! field and the light.

use cgmath::{Deg, Rad, Vector3};
use rand::Rng;
use wgpu::util::DeviceExt;

use crate::{
    colour::Colour,
    config::SceneConfig,
    context::InitContext,
    data_structures::{instance::InstanceRaw, model::Mesh},
    pipelines::{
        light::LightUniform,
        particles::{PointCloud, PointRaw, PointsMaterial, points_material_layout},
        toon::{ToonMaterial, toon_material_layout},
    },
    render::{Render, Toon},
    resources::{
        gradient::load_gradient,
        sphere::{SphereDesc, SphereGeometry},
    },
    scene::{
        entity::{Pose, SECTION_LAYOUT},
        panel::MaterialPalette,
    },
};

/// Toon colour of each section mesh, in section order.
pub const SECTION_COLOURS: [&str; 4] = ["#E4572E", "#17BEBB", "#FFC914", "#76B041"];

const SPHERE_WIDTH_SEGMENTS: u32 = 36;
const SPHERE_HEIGHT_SEGMENTS: u32 = 50;
const SPHERE_PHI_START: f32 = 60.0;

/// The light of the scene: a white directional light from (0.5, 1, 1) plus a
/// dim white ambient term.
pub fn scene_light() -> LightUniform {
    LightUniform::directional(Vector3::new(0.5, 1.0, 1.0), [1.0; 3], 3.0, 0.3)
}

/// The toon colours as linear colours.
pub fn section_colours() -> anyhow::Result<Vec<Colour>> {
    SECTION_COLOURS.iter().map(|hex| Colour::from_hex(hex)).collect()
}

/// Scatter `count` particles over the vertical extent of `sections` sections.
///
/// x and z are spread over `[-5, 5)`, y from half a section above the first
/// section down through the last one.
pub fn scatter_particles<R: Rng>(
    rng: &mut R,
    count: usize,
    objects_distance: f32,
    sections: usize,
) -> Vec<PointRaw> {
    (0..count)
        .map(|_| {
            let x = (rng.random::<f32>() - 0.5) * 10.0;
            let y = objects_distance * 0.5
                - rng.random::<f32>() * objects_distance * sections as f32;
            let z = (rng.random::<f32>() - 0.5) * 10.0;
            PointRaw {
                position: [x, y, z],
            }
        })
        .collect()
}

pub struct ComposedScene {
    toon_materials: Vec<ToonMaterial>,
    spheres: Vec<Mesh>,
    section_instances: wgpu::Buffer,
    particles: PointCloud,
    show_section_meshes: bool,
}

impl ComposedScene {
    /// Build every static GPU resource of the scene.
    ///
    /// The gradient map falls back to a generated one if it cannot be loaded,
    /// so this never fails on missing assets.
    pub async fn new<R: Rng>(
        init: &InitContext,
        config: &SceneConfig,
        rng: &mut R,
        palette: &MaterialPalette,
    ) -> Self {
        let device = &init.device;
        let positions = scatter_particles(
            rng,
            config.scene.particle_count,
            config.scene.objects_distance,
            SECTION_LAYOUT.len(),
        );

        let gradient = load_gradient(&config.assets.gradient, device, &init.queue).await;
        let toon_layout = toon_material_layout(device);
        let toon_materials = palette
            .toon
            .iter()
            .enumerate()
            .map(|(i, colour)| {
                ToonMaterial::new(
                    device,
                    &format!("material{}", i + 1),
                    *colour,
                    &gradient,
                    &toon_layout,
                )
            })
            .collect();

        let spheres = SECTION_LAYOUT
            .iter()
            .enumerate()
            .map(|(i, (radius, _))| {
                let desc = SphereDesc::new(
                    *radius,
                    SPHERE_WIDTH_SEGMENTS,
                    SPHERE_HEIGHT_SEGMENTS,
                    SPHERE_PHI_START,
                );
                SphereGeometry::new(&desc).to_mesh(device, &format!("mesh{}", i + 1), i)
            })
            .collect();

        let identity = vec![Pose::default().to_instance().to_raw(); SECTION_LAYOUT.len()];
        let section_instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Section Instance Buffer"),
            contents: bytemuck::cast_slice(&identity),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let fovy: Rad<f32> = Deg(config.camera.fov).into();
        let points_material = PointsMaterial::new(
            device,
            palette.particles,
            config.scene.particle_size,
            fovy,
            &points_material_layout(device),
        );
        let particles = PointCloud::new(device, &positions, points_material);
        log::info!(
            "Scene composed: {} section meshes, {} particles",
            SECTION_LAYOUT.len(),
            particles.len()
        );

        Self {
            toon_materials,
            spheres,
            section_instances,
            particles,
            show_section_meshes: config.scene.show_section_meshes,
        }
    }

    /// Upload the section mesh transforms.
    pub fn write_sections(&self, poses: &[Pose], queue: &wgpu::Queue) {
        let raw: Vec<InstanceRaw> = poses
            .iter()
            .take(self.spheres.len())
            .map(|pose| pose.to_instance().to_raw())
            .collect();
        queue.write_buffer(&self.section_instances, 0, bytemuck::cast_slice(&raw));
    }

    /// Upload the palette colours into the material uniforms.
    pub fn apply_palette(&mut self, palette: &MaterialPalette, queue: &wgpu::Queue) {
        for (material, colour) in self.toon_materials.iter_mut().zip(&palette.toon) {
            if material.colour() != *colour {
                material.set_colour(*colour, queue);
            }
        }
        if self.particles.material.colour() != palette.particles {
            self.particles.material.set_colour(palette.particles, queue);
        }
    }

    pub fn render(&self) -> Render<'_> {
        let mut renders = Vec::with_capacity(2);
        if self.show_section_meshes {
            let toons = self
                .spheres
                .iter()
                .enumerate()
                .filter_map(|(i, mesh)| {
                    let material = self.toon_materials.get(mesh.material)?;
                    Some(Toon {
                        mesh,
                        material: &material.bind_group,
                        instance: &self.section_instances,
                        instances: i as u32..i as u32 + 1,
                    })
                })
                .collect();
            renders.push(Render::Toon(toons));
        }
        renders.push(Render::Points(self.particles.render()));
        Render::Composed(renders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};

    #[test]
    fn particles_fill_the_section_volume() {
        let mut rng = SmallRng::seed_from_u64(42);
        let points = scatter_particles(&mut rng, 200, 4.0, 4);
        assert_eq!(points.len(), 200);
        for point in &points {
            let [x, y, z] = point.position;
            assert!((-5.0..5.0).contains(&x));
            assert!((-5.0..5.0).contains(&z));
            assert!(y <= 2.0 && y > 2.0 - 16.0, "y = {y}");
        }
    }

    #[test]
    fn same_seed_same_field() {
        let a = scatter_particles(&mut SmallRng::seed_from_u64(1), 10, 4.0, 4);
        let b = scatter_particles(&mut SmallRng::seed_from_u64(1), 10, 4.0, 4);
        assert_eq!(
            a.iter().map(|p| p.position).collect::<Vec<_>>(),
            b.iter().map(|p| p.position).collect::<Vec<_>>()
        );
    }

    #[test]
    fn four_section_colours_parse() {
        let colours = section_colours().unwrap();
        assert_eq!(colours.len(), SECTION_LAYOUT.len());
        assert_eq!(colours[0].to_srgb8(), [0xE4, 0x57, 0x2E]);
    }

    #[test]
    fn light_points_towards_the_key_light() {
        let direction = scene_light().direction();
        assert!(direction.iter().all(|c| *c > 0.0));
    }
}
