//! Camera rig, projection and the camera uniform.
//!
//! The camera sits inside a rig: the rig carries the cursor parallax offset,
//! the camera carries the scroll elevation and its distance from the scene.
//! The two offsets compose through the hierarchy, the camera never rotates and
//! always looks down -z.

use cgmath::{Matrix4, Point3, Rad, Vector2, Vector3, perspective};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A parent transform (the rig) holding the actual camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    /// Parallax offset of the rig in x/y.
    pub offset: Vector2<f32>,
    /// Local y of the camera inside the rig, driven by scroll.
    pub elevation: f32,
    /// Local z of the camera inside the rig.
    pub distance: f32,
}

impl CameraRig {
    pub fn new(distance: f32) -> Self {
        Self {
            offset: Vector2::new(0.0, 0.0),
            elevation: 0.0,
            distance,
        }
    }

    /// World position of the camera: rig offset composed with the camera's local position.
    pub fn eye(&self) -> Point3<f32> {
        Point3::new(
            self.offset.x,
            self.offset.y + self.elevation,
            self.distance,
        )
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.eye(), -Vector3::unit_z(), Vector3::unit_y())
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new(6.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(aspect: f32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Sets the aspect ratio; the matrix is recomputed on the next [`Self::calc_matrix`].
    pub fn resize(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Camera data as the shaders see it.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view: cgmath::Matrix4::identity().into(),
            proj: cgmath::Matrix4::identity().into(),
            view_proj: cgmath::Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, rig: &CameraRig, projection: &Projection) {
        let view = rig.calc_matrix();
        let proj = projection.calc_matrix();
        self.view_position = rig.eye().to_homogeneous().into();
        self.view = view.into();
        self.proj = proj.into();
        self.view_proj = (proj * view).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub rig: CameraRig,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, rig: CameraRig, projection: &Projection) -> Self {
        use wgpu::util::DeviceExt;

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&rig, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            rig,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Recompute the uniform from the rig and upload it.
    pub fn write(&mut self, projection: &Projection, queue: &wgpu::Queue) {
        self.uniform.update_view_proj(&self.rig, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
