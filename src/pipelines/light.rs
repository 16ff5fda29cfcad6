use cgmath::InnerSpace;
use wgpu::util::DeviceExt;

/// One directional light plus an ambient term.
#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(uniform: LightUniform, device: &wgpu::Device) -> Self {
        let bind_group_layout = mk_bind_group_layout(device);
        let buffer = mk_buffer(device, uniform);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn set(&mut self, uniform: LightUniform, queue: &wgpu::Queue) {
        self.uniform = uniform;
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    /// Normalised direction pointing towards the light.
    direction: [f32; 3],
    intensity: f32,
    colour: [f32; 3],
    ambient: f32,
}

impl LightUniform {
    /// A light shining from `position` towards the origin, like a directional
    /// light placed at `position` with its default target.
    pub fn directional(
        position: cgmath::Vector3<f32>,
        colour: [f32; 3],
        intensity: f32,
        ambient: f32,
    ) -> Self {
        Self {
            direction: position.normalize().into(),
            intensity,
            colour,
            ambient,
        }
    }

    pub fn direction(&self) -> [f32; 3] {
        self.direction
    }
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::directional(cgmath::Vector3::new(0.0, 1.0, 0.0), [1.0; 3], 1.0, 0.0)
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
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
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn direction_is_normalised() {
        let light = LightUniform::directional(cgmath::Vector3::new(0.5, 1.0, 1.0), [1.0; 3], 3.0, 0.3);
        let [x, y, z] = light.direction();
        assert_relative_eq!((x * x + y * y + z * z).sqrt(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(x, 0.5 / 1.5, epsilon = 1e-6);
    }

    #[test]
    fn uniform_is_two_vec4s() {
        assert_eq!(std::mem::size_of::<LightUniform>(), 32);
    }
}
