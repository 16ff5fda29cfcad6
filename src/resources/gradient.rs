//! Gradient maps for toon shading.
//!
//! A gradient map is a tiny 1D lookup texture: the toon shader samples it
//! with the half-Lambert term, and nearest sampling turns the result into hard
//! bands.

use crate::{data_structures::texture::Texture, resources::texture::load_texture};

/// Band intensities of the generated fallback gradient.
pub const FALLBACK_STEPS: [u8; 3] = [0, 128, 255];

/// One RGBA pixel per step, left (unlit) to right (fully lit).
pub fn step_pixels(steps: &[u8]) -> Vec<u8> {
    steps.iter().flat_map(|&s| [s, s, s, 255]).collect()
}

pub fn generated(device: &wgpu::Device, queue: &wgpu::Queue, steps: &[u8]) -> Texture {
    let steps = if steps.is_empty() { &FALLBACK_STEPS[..] } else { steps };
    // Gradient values are lookup data, not colours, so they are stored linear.
    Texture::from_rgba(
        device,
        queue,
        &step_pixels(steps),
        [steps.len() as u32, 1],
        "generated gradient map",
        true,
    )
    .with_nearest_sampler(device)
}

/// Load the gradient map at `file_name`, or fall back to [`FALLBACK_STEPS`].
pub async fn load_gradient(file_name: &str, device: &wgpu::Device, queue: &wgpu::Queue) -> Texture {
    match load_texture(file_name, true, device, queue, None).await {
        Ok(texture) => texture.with_nearest_sampler(device),
        Err(e) => {
            log::warn!("Cannot load gradient map {file_name}, using a generated one: {e:#}");
            generated(device, queue, &FALLBACK_STEPS)
        }
    }
}
