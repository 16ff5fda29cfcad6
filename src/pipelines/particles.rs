use cgmath::{Angle, Rad};
use wgpu::util::DeviceExt;

use crate::{
    colour::Colour,
    data_structures::{model::Vertex, texture::Texture},
    pipelines::basic::mk_render_pipeline,
    render::Points,
};

/// One particle position, stepped per instance.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointRaw {
    pub position: [f32; 3],
}

impl Vertex for PointRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointsUniform {
    colour_size: [f32; 4],
}

impl PointsUniform {
    /// `size` is the attenuated point size: a point at depth `z` covers
    /// `size * half_height / z` pixels. The shader draws world-space quads, so
    /// the size is converted with the camera's vertical field of view.
    pub fn new(colour: Colour, size: f32, fovy: Rad<f32>) -> Self {
        Self {
            colour_size: colour.extend(world_size(size, fovy)),
        }
    }
}

pub fn world_size(size: f32, fovy: Rad<f32>) -> f32 {
    size * (fovy / 2.0).tan()
}

/// Colour and size of a point cloud.
#[derive(Debug)]
pub struct PointsMaterial {
    colour: Colour,
    size: f32,
    fovy: Rad<f32>,
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl PointsMaterial {
    pub fn new(
        device: &wgpu::Device,
        colour: Colour,
        size: f32,
        fovy: Rad<f32>,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Points Material Buffer"),
            contents: bytemuck::cast_slice(&[PointsUniform::new(colour, size, fovy)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("points_material_bind_group"),
        });
        Self {
            colour,
            size,
            fovy,
            buffer,
            bind_group,
        }
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    pub fn set_colour(&mut self, colour: Colour, queue: &wgpu::Queue) {
        self.colour = colour;
        queue.write_buffer(
            &self.buffer,
            0,
            bytemuck::cast_slice(&[PointsUniform::new(colour, self.size, self.fovy)]),
        );
    }
}

/// GPU side of a point cloud: positions plus material.
#[derive(Debug)]
pub struct PointCloud {
    positions: wgpu::Buffer,
    amount: u32,
    pub material: PointsMaterial,
}

impl PointCloud {
    pub fn new(device: &wgpu::Device, positions: &[PointRaw], material: PointsMaterial) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Points Buffer"),
            contents: bytemuck::cast_slice(positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            positions: buffer,
            amount: positions.len() as u32,
            material,
        }
    }

    pub fn len(&self) -> usize {
        self.amount as usize
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    pub fn render(&self) -> Points<'_> {
        Points {
            positions: &self.positions,
            material: &self.material.bind_group,
            amount: self.amount,
        }
    }
}

pub fn points_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("points_material_bind_group_layout"),
    })
}

pub fn mk_particles_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Particles Pipeline Layout"),
        bind_group_layouts: &[Some(&points_material_layout(device)), Some(camera_bind_group_layout)],
        immediate_size: 0,
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Particles Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("particles.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(wgpu::BlendState::REPLACE),
        Some(Texture::DEPTH_FORMAT),
        None,
        &[PointRaw::desc()],
        shader,
    )
}

pub trait DrawPoints<'a> {
    fn draw_points(&mut self, points: &Points<'a>, camera_bind_group: &'a wgpu::BindGroup);
}

impl<'a, 'b> DrawPoints<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_points(&mut self, points: &Points<'b>, camera_bind_group: &'b wgpu::BindGroup) {
        self.set_vertex_buffer(0, points.positions.slice(..));
        self.set_bind_group(0, points.material, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.draw(0..6, 0..points.amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Deg;

    #[test]
    fn world_size_matches_attenuated_point_size() {
        // With a 90 degree field of view tan(fov / 2) is 1.
        assert_relative_eq!(world_size(0.03, Deg(90.0).into()), 0.03, epsilon = 1e-6);
        assert!(world_size(0.03, Deg(35.0).into()) < 0.03);
    }

    #[test]
    fn uniform_packs_size_into_w() {
        let uniform = PointsUniform::new(Colour::WHITE, 0.03, Deg(90.0).into());
        assert_eq!(uniform.colour_size[..3], [1.0, 1.0, 1.0]);
        assert_relative_eq!(uniform.colour_size[3], 0.03, epsilon = 1e-6);
    }
}
