use wgpu::util::DeviceExt;

use crate::{
    colour::Colour,
    data_structures::{instance::InstanceRaw, model::{ModelVertex, Vertex}, texture::Texture},
    pipelines::basic::mk_render_pipeline,
    render::Toon,
};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ToonUniform {
    colour: [f32; 4],
}

impl From<Colour> for ToonUniform {
    fn from(colour: Colour) -> Self {
        Self {
            colour: colour.extend(1.0),
        }
    }
}

/// A flat colour shaded through a shared gradient map.
#[derive(Debug)]
pub struct ToonMaterial {
    pub name: String,
    colour: Colour,
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl ToonMaterial {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        colour: Colour,
        gradient: &Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(name),
            contents: bytemuck::cast_slice(&[ToonUniform::from(colour)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = gradient
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&gradient.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some(name),
        });
        Self {
            name: name.to_string(),
            colour,
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
            bytemuck::cast_slice(&[ToonUniform::from(colour)]),
        );
    }
}

pub fn toon_material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("toon_material_bind_group_layout"),
    })
}

pub fn mk_toon_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    light_bind_group_layout: &wgpu::BindGroupLayout,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Toon Pipeline Layout"),
        bind_group_layouts: &[
            Some(&toon_material_layout(device)),
            Some(camera_bind_group_layout),
            Some(light_bind_group_layout),
        ],
        immediate_size: 0,
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Toon Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("toon.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(wgpu::BlendState::REPLACE),
        Some(Texture::DEPTH_FORMAT),
        Some(wgpu::Face::Back),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}

pub trait DrawToon<'a> {
    fn draw_toon(
        &mut self,
        toon: &Toon<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawToon<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_toon(
        &mut self,
        toon: &Toon<'b>,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, toon.mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, toon.instance.slice(..));
        self.set_index_buffer(toon.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, toon.material, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        self.draw_indexed(0..toon.mesh.num_elements, 0, toon.instances.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_carries_the_linear_colour() {
        let colour = Colour::from_hex("#17BEBB").unwrap();
        let uniform = ToonUniform::from(colour);
        assert_eq!(uniform.colour, [colour.r, colour.g, colour.b, 1.0]);
        assert_eq!(std::mem::size_of::<ToonUniform>(), 16);
    }
}
