//! Viewport dimensions and the render-target size derived from them.
//!
//! winit reports sizes in physical pixels. Everything that reasons about the
//! page (scroll offsets, cursor normalisation, aspect ratio) works in logical
//! pixels, while the surface is sized by the clamped pixel ratio.

use winit::dpi::PhysicalSize;

/// Upper bound for the pixel ratio used to size the render target.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical width.
    pub width: f32,
    /// Logical height.
    pub height: f32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f32>(scale_factor);
        Self::new(logical.width, logical.height, scale_factor as f32)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// The device pixel ratio, clamped to [`MAX_PIXEL_RATIO`].
    pub fn pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    /// Size of the drawing buffer in pixels, never zero.
    pub fn render_target(&self) -> [u32; 2] {
        let ratio = self.pixel_ratio();
        [
            ((self.width * ratio).round() as u32).max(1),
            ((self.height * ratio).round() as u32).max(1),
        ]
    }

    /// Converts a physical pixel coordinate into a logical one.
    pub fn to_logical(&self, physical: f64) -> f32 {
        (physical / self.device_pixel_ratio as f64) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn aspect_is_width_over_height() {
        let viewport = Viewport::new(1600.0, 900.0, 1.0);
        assert_eq!(viewport.aspect(), 1600.0 / 900.0);
    }

    #[test]
    fn pixel_ratio_is_clamped_to_two() {
        assert_eq!(Viewport::new(800.0, 600.0, 1.0).pixel_ratio(), 1.0);
        assert_eq!(Viewport::new(800.0, 600.0, 1.5).pixel_ratio(), 1.5);
        assert_eq!(Viewport::new(800.0, 600.0, 3.0).pixel_ratio(), 2.0);
    }

    #[test]
    fn render_target_uses_the_clamped_ratio() {
        assert_eq!(Viewport::new(800.0, 600.0, 3.0).render_target(), [1600, 1200]);
        assert_eq!(Viewport::new(800.0, 600.0, 1.0).render_target(), [800, 600]);
    }

    #[test]
    fn physical_sizes_are_converted_to_logical() {
        let viewport = Viewport::from_physical(PhysicalSize::new(2400, 1800), 3.0);
        assert_relative_eq!(viewport.width, 800.0);
        assert_relative_eq!(viewport.height, 600.0);
        assert_eq!(viewport.render_target(), [1600, 1200]);
        assert_relative_eq!(viewport.to_logical(300.0), 100.0);
    }

    #[test]
    fn zero_sized_viewport_is_empty_but_has_a_drawable_target() {
        let viewport = Viewport::new(0.0, 600.0, 1.0);
        assert!(viewport.is_empty());
        assert_eq!(viewport.render_target(), [1, 600]);
    }
}
