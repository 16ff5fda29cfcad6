//! Render pipelines.
//!
//! - `basic` draws textured GLTF models with directional + ambient lighting
//! - `toon` draws flat-coloured meshes through a stepped gradient map
//! - `particles` draws camera-facing point quads
//! - `light` holds the light uniform shared by the lit pipelines

pub mod basic;
pub mod light;
pub mod particles;
pub mod toon;
