//! UV sphere generation.

use std::f32::consts::{PI, TAU};

use cgmath::{InnerSpace, Vector3};
use wgpu::util::DeviceExt;

use crate::data_structures::model::{Mesh, ModelVertex};

/// Parameters of a UV sphere.
///
/// The sweep starts at `phi_start` around the y axis and at the north pole
/// (`theta` = 0). Seams and poles follow the common web convention: vertex
/// rows run from the north pole down, columns around the equator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereDesc {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub phi_start: f32,
    pub phi_length: f32,
    pub theta_start: f32,
    pub theta_length: f32,
}

impl SphereDesc {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32, phi_start: f32) -> Self {
        Self {
            radius,
            width_segments: width_segments.max(3),
            height_segments: height_segments.max(2),
            phi_start,
            phi_length: TAU,
            theta_start: 0.0,
            theta_length: PI,
        }
    }
}

/// CPU side of the sphere: vertices plus triangle list indices.
#[derive(Debug, Clone, Default)]
pub struct SphereGeometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl SphereGeometry {
    pub fn new(desc: &SphereDesc) -> Self {
        let SphereDesc {
            radius,
            width_segments,
            height_segments,
            phi_start,
            phi_length,
            theta_start,
            theta_length,
        } = *desc;
        let theta_end = (theta_start + theta_length).min(PI);

        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        let mut grid = Vec::with_capacity(height_segments as usize + 1);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            // poles get their u shifted half a segment so the texture does not pinch
            let u_offset = if iy == 0 && theta_start == 0.0 {
                0.5 / width_segments as f32
            } else if iy == height_segments && theta_end == PI {
                -0.5 / width_segments as f32
            } else {
                0.0
            };

            let mut row = Vec::with_capacity(width_segments as usize + 1);
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let phi = phi_start + u * phi_length;
                let theta = theta_start + v * theta_length;
                let position = Vector3::new(
                    -radius * phi.cos() * theta.sin(),
                    radius * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                );
                let normal = if position.magnitude2() > 0.0 {
                    position.normalize()
                } else {
                    position
                };
                row.push(vertices.len() as u32);
                vertices.push(ModelVertex {
                    position: position.into(),
                    tex_coords: [u + u_offset, v],
                    normal: normal.into(),
                    ..Default::default()
                });
            }
            grid.push(row);
        }

        let mut indices = Vec::new();
        for iy in 0..height_segments as usize {
            for ix in 0..width_segments as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                // the pole rows degenerate to one triangle per segment
                if iy != 0 || theta_start > 0.0 {
                    indices.extend([a, b, d]);
                }
                if iy != height_segments as usize - 1 || theta_end < PI {
                    indices.extend([b, c, d]);
                }
            }
        }

        Self { vertices, indices }
    }

    pub fn to_mesh(&self, device: &wgpu::Device, name: &str, material: usize) -> Mesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Index Buffer")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Mesh {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
            material,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn counts_match_the_segment_grid() {
        let sphere = SphereGeometry::new(&SphereDesc::new(0.5, 36, 50, 60.0));
        assert_eq!(sphere.vertices.len(), 37 * 51);
        // two triangles per quad, minus one per segment at each pole
        assert_eq!(sphere.indices.len(), (36 * 50 * 2 - 2 * 36) * 3);
        assert!(sphere.indices.iter().all(|&i| (i as usize) < sphere.vertices.len()));
    }

    #[test]
    fn vertices_lie_on_the_sphere() {
        let sphere = SphereGeometry::new(&SphereDesc::new(0.3, 12, 8, 60.0));
        for vertex in &sphere.vertices {
            let position = Vector3::from(vertex.position);
            assert_relative_eq!(position.magnitude(), 0.3, epsilon = 1e-5);
            let normal = Vector3::from(vertex.normal);
            assert_relative_eq!(normal.dot(position.normalize()), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn poles_are_top_and_bottom() {
        let sphere = SphereGeometry::new(&SphereDesc::new(1.0, 8, 4, 0.0));
        assert_relative_eq!(sphere.vertices[0].position[1], 1.0);
        assert_relative_eq!(sphere.vertices.last().unwrap().position[1], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn degenerate_segment_counts_are_raised() {
        let desc = SphereDesc::new(1.0, 0, 0, 0.0);
        assert_eq!((desc.width_segments, desc.height_segments), (3, 2));
    }
}
