//! The immediate-mode overlay flows draw their parameter widgets into.
//!
//! Input reaches egui before any flow; events egui consumes (a drag on a
//! colour picker, typing into a text field) are not forwarded to the flows.

use winit::{event::WindowEvent, window::Window};

/// Output of one egui frame, drawn after the scene.
pub(crate) struct GuiFrame {
    jobs: Vec<egui::ClippedPrimitive>,
    textures: egui::TexturesDelta,
}

pub(crate) struct Gui {
    ctx: egui::Context,
    winit: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

impl std::fmt::Debug for Gui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gui").finish_non_exhaustive()
    }
}

impl Gui {
    pub(crate) fn new(
        window: &Window,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
    ) -> Self {
        let ctx = egui::Context::default();
        let winit = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(
            device,
            format,
            egui_wgpu::RendererOptions {
                msaa_samples: 1,
                depth_stencil_format: None,
                dithering: false,
                ..Default::default()
            },
        );
        Self {
            ctx,
            winit,
            renderer,
        }
    }

    /// Feed a window event to egui. Returns whether egui consumed it.
    pub(crate) fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.winit.on_window_event(window, event).consumed
    }

    /// Run one egui frame, `run_ui` adds the widgets.
    pub(crate) fn run(
        &mut self,
        window: &Window,
        mut run_ui: impl FnMut(&egui::Context),
    ) -> GuiFrame {
        let raw_input = self.winit.take_egui_input(window);
        let output = self.ctx.run(raw_input, |ctx| run_ui(ctx));
        self.winit
            .handle_platform_output(window, output.platform_output);
        let jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        GuiFrame {
            jobs,
            textures: output.textures_delta,
        }
    }

    /// Upload the textures `frame` created or changed. Must run every frame,
    /// even when nothing is drawn, or later frames reference missing textures.
    pub(crate) fn update_textures(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &mut GuiFrame,
    ) {
        for (id, delta) in std::mem::take(&mut frame.textures.set) {
            self.renderer.update_texture(device, queue, id, &delta);
        }
    }

    /// Draw `frame` on top of `view`.
    ///
    /// Widgets are laid out in logical pixels; `pixels_per_point` is the
    /// render target's pixel ratio, which may be below the window's. Returns
    /// command buffers that must be submitted before `encoder`.
    pub(crate) fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        frame: GuiFrame,
        size_in_pixels: [u32; 2],
        pixels_per_point: f32,
    ) -> Vec<wgpu::CommandBuffer> {
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point,
        };
        let commands = self
            .renderer
            .update_buffers(device, queue, encoder, &frame.jobs, &screen);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("GUI Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.renderer.render(&mut pass, &frame.jobs, &screen);
        }
        for id in &frame.textures.free {
            self.renderer.free_texture(id);
        }
        commands
    }
}
