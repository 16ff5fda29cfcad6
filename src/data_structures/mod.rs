//! Scene data: meshes, materials, textures, per-instance transforms and the
//! scene graph the loaded models live in.
//!
//! - `model` holds vertex layouts, meshes and textured materials
//! - `texture` wraps GPU textures (depth, solid colours, decoded images)
//! - `instance` holds per-instance transformation data
//! - `scene_graph` composes models into a transform hierarchy

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
