//! scroll-flow
//!
//! A scroll-driven 3D scene on a small flow-based renderer. Scrolling moves
//! the camera down through four stacked sections and spins the section mesh
//! of every section it enters; the cursor adds a smoothed parallax drift. Two
//! GLTF models, a toon-shaded mesh per section and a particle field share a
//! single directional light. Runs natively and in the browser.
//!
//! High-level modules
//! - `camera`: camera rig, projection and the camera uniform
//! - `colour`: hex parsing and sRGB/linear conversion
//! - `config`: layered scene configuration
//! - `context`: GPU and window context that owns device, queue and pipelines
//! - `data_structures`: meshes, instances, textures and the scene graph
//! - `flow`: the flow trait and the event loop driving it
//! - `gui`: the egui overlay flows add their widgets to
//! - `pipelines`: textured, toon and particle pipelines plus the light uniform
//! - `render`: render composition and per-pipeline batching
//! - `resources`: GLTF, texture, gradient and sphere loading
//! - `scene`: the scroll scene itself
//! - `viewport`: logical size and pixel ratio of the window
//!

pub mod camera;
pub mod colour;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
mod gui;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod viewport;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use egui;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Open the window and run the scroll scene until it is closed.
pub fn start(config: config::SceneConfig) -> anyhow::Result<()> {
    let window = config.window.clone();
    flow::run(window, vec![scene::constructor(config)])
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    start(config::SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
