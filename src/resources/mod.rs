use std::io::{BufReader, Cursor};

use anyhow::Context;
use wgpu::util::DeviceExt;

use crate::{
    colour::Colour,
    data_structures::{
        instance::Instance,
        model::{self, ModelVertex},
        scene_graph::{ContainerNode, ModelNode, SceneNode},
        texture::Texture,
    },
    resources::texture::{diffuse_normal_layout, load_binary, load_texture, mime_extension},
};

/**
 * This module contains all logic for loading meshes/textures/etc. from external files
 * and for generating the procedural ones (spheres, gradient maps).
 */
pub mod gradient;
pub mod sphere;
pub mod texture;

/// Load a `.glb`/`.gltf` file into a scene graph.
///
/// The file's root nodes hang below a fresh [`ContainerNode`] with a single
/// instance, so the caller can place the whole model through the root's
/// local transform without touching the transforms stored in the file.
pub async fn load_model_gltf(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Box<dyn SceneNode>> {
    let gltf_bytes = load_binary(file_name).await?;
    let gltf_reader = BufReader::new(Cursor::new(gltf_bytes));
    let gltf = gltf::Gltf::from_reader(gltf_reader)
        .with_context(|| format!("{file_name} is not a valid GLTF file"))?;

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .with_context(|| format!("{file_name} references a missing binary chunk"))?;
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(&sibling_path(file_name, uri)).await?;
                buffer_data.push(bin);
            }
        }
    }

    // Load materials
    let layout = diffuse_normal_layout(device);
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let name = material
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{file_name}#{}", materials.len()));
        let pbr = material.pbr_metallic_roughness();
        let diffuse_texture = match pbr.base_color_texture() {
            Some(info) => {
                load_image(file_name, info.texture().source(), &buffer_data, false, device, queue)
                    .await?
            }
            None => Texture::solid(
                device,
                queue,
                base_colour_rgba(pbr.base_color_factor()),
                &name,
                false,
            ),
        };
        let normal_texture = match material.normal_texture() {
            Some(info) => {
                load_image(file_name, info.texture().source(), &buffer_data, true, device, queue)
                    .await?
            }
            None => Texture::solid(device, queue, FLAT_NORMAL, "default normal map", true),
        };
        materials.push(model::Material::new(
            device,
            &name,
            diffuse_texture,
            normal_texture,
            &layout,
        ));
    }
    // Primitives without a material use the GLTF default material (white).
    let default_material = materials.len();
    materials.push(model::Material::new(
        device,
        "default material",
        Texture::solid(device, queue, [255; 4], "default material", false),
        Texture::solid(device, queue, FLAT_NORMAL, "default normal map", true),
        &layout,
    ));

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .with_context(|| format!("{file_name} contains no scene"))?;

    let mut root = ContainerNode::new(1);
    for node in scene.nodes() {
        root.add_child(to_scene_node(
            node,
            &buffer_data,
            device,
            &materials,
            default_material,
        ));
    }
    root.update_world_transform_all();
    log::info!(
        "Loaded {file_name}: {} root node(s), {} material(s)",
        root.children.len(),
        materials.len() - 1
    );

    Ok(Box::new(root))
}

/// Flat tangent-space normal.
const FLAT_NORMAL: [u8; 4] = [127, 127, 255, 255];

/// GLTF colour factors are linear, the diffuse texture is sRGB encoded.
fn base_colour_rgba(factor: [f32; 4]) -> [u8; 4] {
    let [r, g, b] = Colour::new(factor[0], factor[1], factor[2]).to_srgb8();
    [r, g, b, (factor[3].clamp(0.0, 1.0) * 255.0).round() as u8]
}

/// Resolve a `uri` relative to the file that references it.
fn sibling_path(file_name: &str, uri: &str) -> String {
    match file_name.rsplit_once('/') {
        Some((dir, _)) => format!("{dir}/{uri}"),
        None => uri.to_string(),
    }
}

async fn load_image(
    file_name: &str,
    image: gltf::Image<'_>,
    buffer_data: &[Vec<u8>],
    is_normal_map: bool,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Texture> {
    match image.source() {
        gltf::image::Source::View { view, mime_type } => {
            let buffer = buffer_data
                .get(view.buffer().index())
                .with_context(|| format!("{file_name}: image references a missing buffer"))?;
            let bytes = buffer
                .get(view.offset()..view.offset() + view.length())
                .with_context(|| format!("{file_name}: image view is out of bounds"))?;
            Texture::from_bytes(
                device,
                queue,
                bytes,
                file_name,
                mime_extension(mime_type),
                is_normal_map,
            )
            .with_context(|| format!("{file_name}: cannot decode embedded image"))
        }
        gltf::image::Source::Uri { uri, mime_type } => {
            load_texture(
                &sibling_path(file_name, uri),
                is_normal_map,
                device,
                queue,
                mime_type.and_then(mime_extension),
            )
            .await
        }
    }
}

fn to_scene_node(
    node: gltf::scene::Node,
    buffer_data: &[Vec<u8>],
    device: &wgpu::Device,
    materials: &[model::Material],
    default_material: usize,
) -> Box<dyn SceneNode> {
    let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
        Some(mesh) => {
            let name = mesh.name().unwrap_or("unknown_mesh");
            let meshes = mesh
                .primitives()
                .filter_map(|primitive| {
                    load_primitive(name, &primitive, buffer_data, device, default_material)
                })
                .collect();
            let model = model::Model {
                meshes,
                materials: materials.to_vec(),
            };
            Box::new(ModelNode::from_model(1, device, model))
        }
        None => Box::new(ContainerNode::new(1)),
    };
    let (position, rotation, scale) = node.transform().decomposed();
    scene_node.set_local_transform(
        0,
        Instance {
            position: position.into(),
            rotation: rotation.into(),
            scale: scale.into(),
        },
    );
    for child in node.children() {
        scene_node.add_child(to_scene_node(
            child,
            buffer_data,
            device,
            materials,
            default_material,
        ));
    }
    scene_node
}

fn load_primitive(
    mesh_name: &str,
    primitive: &gltf::Primitive,
    buffer_data: &[Vec<u8>],
    device: &wgpu::Device,
    default_material: usize,
) -> Option<model::Mesh> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        log::warn!(
            "Skipping primitive {} of mesh {mesh_name}: {:?} is not supported",
            primitive.index(),
            primitive.mode()
        );
        return None;
    }
    let reader = primitive.reader(|buffer| buffer_data.get(buffer.index()).map(Vec::as_slice));

    let Some(positions) = reader.read_positions() else {
        log::warn!(
            "Skipping primitive {} of mesh {mesh_name}: it has no positions",
            primitive.index()
        );
        return None;
    };
    let mut vertices: Vec<ModelVertex> = positions
        .map(|position| ModelVertex {
            position,
            ..Default::default()
        })
        .collect();
    if let Some(normals) = reader.read_normals() {
        vertices
            .iter_mut()
            .zip(normals)
            .for_each(|(vertex, normal)| vertex.normal = normal);
    }
    if let Some(tex_coords) = reader.read_tex_coords(0) {
        vertices
            .iter_mut()
            .zip(tex_coords.into_f32())
            .for_each(|(vertex, tex_coords)| vertex.tex_coords = tex_coords);
    }
    if let Some(tangents) = reader.read_tangents() {
        vertices.iter_mut().zip(tangents).for_each(|(vertex, tangent)| {
            // GLTF stores the bitangent sign in w
            let tangent: cgmath::Vector4<f32> = tangent.into();
            let normal: cgmath::Vector3<f32> = vertex.normal.into();
            vertex.tangent = tangent.truncate().into();
            vertex.bitangent = (normal.cross(tangent.truncate()) * tangent.w).into();
        });
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };
    if indices.is_empty() {
        return None;
    }

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{mesh_name} Vertex Buffer")),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{mesh_name} Index Buffer")),
        contents: bytemuck::cast_slice(&indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    Some(model::Mesh {
        name: mesh_name.to_string(),
        vertex_buffer,
        index_buffer,
        num_elements: indices.len() as u32,
        material: primitive.material().index().unwrap_or(default_material),
    })
}
