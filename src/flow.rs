//! Flow control and application event loop.
//!
//! A "flow" is a scene that handles user input, updates its state and
//! describes what it wants drawn every frame. The engine owns the window, the
//! GPU context and the frame schedule, and hands events to every flow.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S, E>`] is the trait for scenes that handle events and rendering
//! - [`Out<E>`] is the output type for async event handling and context configuration
//!
//! # Lifecycle
//!
//! The event loop follows this pattern:
//! 1. Collect window/device events
//! 2. Let the overlay take the events it consumes, call
//!    `on_<device/window/custom>_events` on all flows with the rest
//! 3. On `RedrawRequested`: call `on_ui` and then `on_update` on all flows,
//!    upload the camera uniform, collect every flow's `on_render()` and draw
//!    the batches, then the overlay
//! 4. Present the frame and request the next redraw

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    config::WindowConfig,
    context::{Context, InitContext},
    data_structures::{model::DrawModel, texture::Texture},
    gui::{Gui, GuiFrame},
    pipelines::{particles::DrawPoints, toon::DrawToon},
    render::{Batches, Render},
    viewport::Viewport,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Canvas element the window renders into on the web.
pub const CANVAS_ID: &str = "canvas";

///
/// This is the Output Type for every lifecycle hook where the user can pass async events that are
/// handled according to the platform you're running on.
///
/// `Out::FutEvent` resolves futures of events that are put in the event queue once resolved. The
/// flow handles them later in `on_custom_events`; they have no side effects unless handled.
///
/// `Out::Configure` modifies the Context, for instance the camera rig or the clear colour.
///
/// `Empty` is the default output used when no eventing/futures need to be handled.
///
pub enum Out<E> {
    FutEvent(Vec<Box<dyn Future<Output = E>>>),
    Configure(Box<dyn FnOnce(&mut Context)>),
    Empty,
}

impl<E> Default for Out<E> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Trait for implementing a renderable scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once when the flow is created; configure the context (camera, clear colour, lights)
/// 2. `on_window_events()` and `on_device_events()` are called for each winit input event
/// 3. `on_custom_events()` is called for resolved `Out::FutEvent`s
/// 4. `on_ui()` is called every frame to add widgets to the overlay
/// 5. `on_update()` is called every frame, before rendering
/// 6. `on_render()` is called every frame and specifies how to render `self`
///
pub trait GraphicsFlow<S, E> {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<E>;

    /// Add widgets to the overlay. Called every frame before `on_update`.
    fn on_ui(&mut self, ui: &egui::Context, state: &mut S);

    /// Update state every frame.
    ///
    /// `dt` is the time since the previous frame. GPU buffers owned by the flow
    /// should be written here; the frame is drawn right after.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<E>;

    /// Handle raw device events.
    fn on_device_events(&mut self, ctx: &Context, state: &mut S, event: &DeviceEvent) -> Out<E>;

    /// Handle window events (keyboard, mouse, window resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out<E>;

    /// Handle custom application events.
    ///
    /// Returns the event if it was not consumed, allowing it to be passed to
    /// the next flow. Returning `None` means the event was consumed.
    fn on_custom_events(&mut self, ctx: &Context, state: &mut S, event: E) -> Option<E>;

    /// Return renderable objects for this flow.
    fn on_render(&self) -> Render<'_>;
}

impl<State, Event> Debug for dyn GraphicsFlow<State, Event> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Type alias for a flow constructor (factory function).
///
/// A flow constructor takes an `InitContext` and asynchronously returns a
/// boxed `GraphicsFlow`. This allows lazy initialization and resource loading.
pub type FlowConsturctor<S, E> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<S, E>>>>>>;

/// Application state bundle: GPU context, app state, and surface status.
#[derive(Debug)]
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    gui: Gui,
    is_surface_configured: bool,
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        let gui = Gui::new(&ctx.window, &ctx.device, ctx.config.format);
        Ok(Self {
            ctx,
            state: State::default(),
            gui,
            is_surface_configured: false,
        })
    }

    /// Apply a new window size (physical pixels) and scale factor.
    ///
    /// The projection takes the logical aspect ratio, the surface and depth
    /// buffer the render-target size under the clamped pixel ratio.
    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>, scale_factor: f64) {
        let viewport = Viewport::from_physical(size, scale_factor);
        if viewport.is_empty() {
            return;
        }
        let [width, height] = viewport.render_target();
        log::debug!(
            "Resize to {}x{} logical, render target {width}x{height}",
            viewport.width,
            viewport.height
        );
        self.ctx.viewport = viewport;
        self.ctx.projection.resize(viewport.aspect());
        self.ctx.config.width = width;
        self.ctx.config.height = height;
        self.ctx
            .surface
            .configure(&self.ctx.device, &self.ctx.config);
        self.ctx.depth_texture =
            Texture::create_depth_texture(&self.ctx.device, [width, height], "depth_texture");
        self.is_surface_configured = true;
    }

    fn resize_to_window(&mut self) {
        let size = self.ctx.window.inner_size();
        let scale_factor = self.ctx.window.scale_factor();
        self.resize(size, scale_factor);
    }

    fn render<Event>(
        &mut self,
        graphics_flows: &mut Vec<Box<dyn GraphicsFlow<State, Event>>>,
        mut ui: GuiFrame,
    ) -> Result<(), wgpu::CurrentSurfaceTexture> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        self.gui
            .update_textures(&self.ctx.device, &self.ctx.queue, &mut ui);

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture)
            | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
            other => return Err(other),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                multiview_mask: None,
                timestamp_writes: None,
            });

            let mut batches = Batches::default();
            graphics_flows
                .iter()
                .for_each(|flow| flow.on_render().set_pipelines(&mut batches));

            let camera = &self.ctx.camera.bind_group;
            let light = &self.ctx.light.bind_group;

            render_pass.set_pipeline(&self.ctx.pipelines.basic);
            for instanced in batches.basics {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    log::warn!("you attemted to render something with zero instances");
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_model_instanced(
                    instanced.model,
                    0..instanced.amount as u32,
                    camera,
                    light,
                );
            }

            render_pass.set_pipeline(&self.ctx.pipelines.toon);
            for toon in batches.toons {
                render_pass.draw_toon(&toon, camera, light);
            }

            render_pass.set_pipeline(&self.ctx.pipelines.particles);
            for points in batches.points {
                if points.amount == 0 {
                    continue;
                }
                render_pass.draw_points(&points, camera);
            }
        }

        let gui_commands = self.gui.paint(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &view,
            ui,
            [self.ctx.config.width, self.ctx.config.height],
            self.ctx.viewport.pixel_ratio(),
        );

        self.ctx
            .queue
            .submit(gui_commands.into_iter().chain(iter::once(encoder.finish())));
        output.present();
        Ok(())
    }
}

pub struct App<State: 'static, Event: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<State, Event>>,
    window_config: WindowConfig,
    state: Option<AppState<State>>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    // This holds the constructors at the start.
    // We use Option to `take()` it after use.
    constructors: Option<Vec<FlowConsturctor<State, Event>>>,
    last_time: Instant,
}

impl<State, Event> App<State, Event>
where
    State: 'static + Default,
    Event: 'static,
{
    fn new(
        event_loop: &EventLoop<FlowEvent<State, Event>>,
        window_config: WindowConfig,
        constructors: Vec<FlowConsturctor<State, Event>>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            window_config,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
        })
    }

    /// Run `on_init` on every flow once the context exists.
    fn init_flows(&mut self) {
        let Some(app_state) = self.state.as_mut() else {
            return;
        };
        // The window may have been sized before the context existed
        app_state.resize_to_window();
        self.graphics_flows.iter_mut().for_each(|flow| {
            let events = flow.on_init(&mut app_state.ctx, &mut app_state.state);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut app_state.ctx,
                self.proxy.clone(),
                events,
            );
        });
        // Time spent setting up (and loading on native) is not animation time.
        self.last_time = Instant::now();
        app_state.ctx.window.request_redraw();
    }
}

pub(crate) enum FlowEvent<State: 'static, Event: 'static> {
    #[allow(dead_code)]
    Initialized {
        state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    },
    Custom(Event),
    #[allow(dead_code)]
    Exit,
}

impl<State, Event> Debug for FlowEvent<State, Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Custom(_) => f.write_str("Custom(E)"),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

impl<State: 'static + Default, Event: 'static> ApplicationHandler<FlowEvent<State, Event>>
    for App<State, Event>
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructors) = self.constructors.take() else {
            // Resumed again after a suspend, everything already exists.
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes =
            Window::default_attributes().with_title(self.window_config.title.clone());

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create the main window: {e}");
                event_loop.exit();
                return;
            }
        };

        let init_future = async move {
            let app_state = AppState::new(window).await?;

            let flow_futures: Vec<_> = constructors
                .into_iter()
                // The clone in into() leverages the internal Arcs of Device and Queue and thus only clones the ref
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let flows: Vec<_> = futures::future::join_all(flow_futures).await;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((app_state, flows)) => {
                    self.state = Some(app_state);
                    self.graphics_flows = flows;
                    self.init_flows();
                }
                Err(e) => {
                    log::error!("App initialization failed. Cannot create the main context: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match init_future.await {
                    Ok((state, flows)) => {
                        assert!(
                            proxy
                                .send_event(FlowEvent::Initialized { state, flows })
                                .is_ok()
                        );
                    }
                    Err(e) => {
                        log::error!("App initialization failed. Cannot create the main context: {e:#}");
                        let _ = proxy.send_event(FlowEvent::Exit);
                    }
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<State, Event>) {
        match event {
            FlowEvent::Initialized { state, flows } => {
                // This is the message from our wasm `spawn_local`
                self.state = Some(state);
                self.graphics_flows = flows;
                self.init_flows();
            }
            FlowEvent::Custom(custom_event) => {
                if let Some(state) = &mut self.state {
                    let result = self
                        .graphics_flows
                        .iter_mut()
                        .fold(Some(custom_event), |event, flow| {
                            flow.on_custom_events(&state.ctx, &mut state.state, event?)
                        });
                    if result.is_some() {
                        log::warn!("Warning! Custom event was not consumed this cycle");
                    }
                }
            }
            FlowEvent::Exit => {
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        self.graphics_flows.iter_mut().for_each(|f| {
            let events = f.on_device_events(&state.ctx, &mut state.state, &event);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut state.ctx,
                self.proxy.clone(),
                events,
            );
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // Resize first so flows see the new viewport when they handle the event
        match event {
            WindowEvent::Resized(size) => {
                let scale_factor = state.ctx.window.scale_factor();
                state.resize(size, scale_factor);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = state.ctx.window.inner_size();
                state.resize(size, scale_factor);
            }
            _ => (),
        }

        let consumed = state.gui.on_window_event(&state.ctx.window, &event);
        if !consumed {
            self.graphics_flows.iter_mut().for_each(|f| {
                let events = f.on_window_events(&state.ctx, &mut state.state, &event);
                handle_flow_output(
                    #[cfg(not(target_arch = "wasm32"))]
                    &self.async_runtime,
                    &mut state.ctx,
                    self.proxy.clone(),
                    events,
                );
            });
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                let flows = &mut self.graphics_flows;
                let app_state = &mut state.state;
                let ui = state.gui.run(&state.ctx.window, |egui_ctx| {
                    flows
                        .iter_mut()
                        .for_each(|f| f.on_ui(egui_ctx, app_state));
                });

                self.graphics_flows.iter_mut().for_each(|f| {
                    let events = f.on_update(&state.ctx, &mut state.state, dt);
                    handle_flow_output(
                        #[cfg(not(target_arch = "wasm32"))]
                        &self.async_runtime,
                        &mut state.ctx,
                        self.proxy.clone(),
                        events,
                    );
                });

                let ctx = &mut state.ctx;
                ctx.camera.write(&ctx.projection, &ctx.queue);

                match state.render(&mut self.graphics_flows, ui) {
                    Ok(_) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated) => {
                        state.resize_to_window();
                    }
                    Err(e) => {
                        log::error!("Unable to render {:?}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

fn handle_flow_output<State, Event>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    ctx: &mut Context,
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<State, Event>>,
    out: Out<Event>,
) {
    match out {
        // Send the events passed by the user to winit
        Out::FutEvent(futures) => {
            let fut =
                async move { futures::future::join_all(futures.into_iter().map(Pin::from)).await };
            #[cfg(not(target_arch = "wasm32"))]
            {
                let resolved = async_runtime.block_on(fut);
                resolved.into_iter().for_each(|event| {
                    if let Err(err) = proxy.send_event(FlowEvent::Custom(event)) {
                        log::error!("Event loop was closed before all events could be processed: {err}");
                    }
                });
            }

            #[cfg(target_arch = "wasm32")]
            {
                wasm_bindgen_futures::spawn_local(async move {
                    let resolved = fut.await;
                    for event in resolved {
                        assert!(proxy.send_event(FlowEvent::Custom(event)).is_ok());
                    }
                });
            }
        }
        Out::Configure(f) => f(ctx),
        Out::Empty => (),
    }
}

pub fn run<State: 'static + Default, Event: 'static>(
    window_config: WindowConfig,
    constructors: Vec<FlowConsturctor<State, Event>>,
) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent<State, Event>> = EventLoop::with_user_event().build()?;

    let mut app: App<State, Event> = App::new(&event_loop, window_config, constructors)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
