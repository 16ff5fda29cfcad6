//! The scroll scene: four sections stacked vertically, a tumbling planet, a
//! figure on a closed orbit and a particle field, seen through a camera that
//! follows the scroll offset and drifts with the cursor.
//!
//! The scene is a single [`GraphicsFlow`] over the shared [`InputState`].

use cgmath::Deg;
use rand::{SeedableRng, rngs::SmallRng};
use winit::{
    event::{DeviceEvent, ElementState, KeyEvent, WindowEvent},
    keyboard::Key,
};

use crate::{
    camera::{CameraRig, Projection},
    colour::Colour,
    config::SceneConfig,
    context::{Context, InitContext},
    flow::{FlowConsturctor, GraphicsFlow, Out},
    render::Render,
};

pub mod composer;
pub mod entity;
pub mod frame;
pub mod input;
pub mod loader;
pub mod panel;
pub mod tween;

use composer::{ComposedScene, scene_light, section_colours};
use entity::{Entities, Pose, Slot, section_poses};
use frame::{FrameDriver, FrameParams};
use input::{InputState, ScrollInput};
use loader::{SceneEvent, load_entity};
use panel::{MaterialPalette, ParameterPanel};
use tween::Tweens;

/// Key that switches the tint to the next swatch.
pub const SWATCH_KEY: &str = "c";

pub struct ScrollScene {
    config: SceneConfig,
    init: InitContext,
    composed: ComposedScene,
    entities: Entities,
    sections: Vec<Pose>,
    tweens: Tweens,
    driver: FrameDriver<SmallRng>,
    panel: ParameterPanel,
    palette: MaterialPalette,
    /// Viewport height the scroll offset was last measured in.
    viewport_height: f32,
}

fn clock_seed() -> u64 {
    instant::SystemTime::now()
        .duration_since(instant::SystemTime::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

impl ScrollScene {
    pub async fn new(init: InitContext, config: SceneConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(clock_seed());
        let panel = ParameterPanel::from_config(&config.panel);
        let toon = section_colours().unwrap_or_else(|e| {
            log::error!("Invalid section colour, using white: {e:#}");
            vec![Colour::WHITE; entity::SECTION_LAYOUT.len()]
        });
        let palette = MaterialPalette::new(toon, panel.value());
        let composed = ComposedScene::new(&init, &config, &mut rng, &palette).await;
        let driver = FrameDriver::new(
            FrameParams::from(&config),
            CameraRig::new(config.camera.distance),
            rng,
        );
        Self {
            config,
            init,
            composed,
            entities: Entities::default(),
            sections: section_poses(),
            tweens: Tweens::new(),
            driver,
            panel,
            palette,
            viewport_height: 0.0,
        }
    }

    fn scroll(&mut self, state: &mut InputState, input: ScrollInput, height: f32) {
        let line_height = self.config.scroll.line_height;
        if let Some(section) = state
            .scroll
            .apply(input, line_height, height, self.sections.len())
        {
            log::debug!("Entered section {section}");
            self.tweens.spin_section(section);
        }
    }
}

/// Flow constructor for [`ScrollScene`].
pub fn constructor(config: SceneConfig) -> FlowConsturctor<InputState, SceneEvent> {
    Box::new(move |init| {
        Box::pin(async move {
            Box::new(ScrollScene::new(init, config).await)
                as Box<dyn GraphicsFlow<InputState, SceneEvent>>
        })
    })
}

impl GraphicsFlow<InputState, SceneEvent> for ScrollScene {
    fn on_init(&mut self, ctx: &mut Context, _: &mut InputState) -> Out<SceneEvent> {
        match Colour::from_hex(&self.config.scene.clear_colour) {
            Ok(colour) => ctx.clear_colour = colour.to_wgpu(),
            Err(e) => log::error!("Invalid clear colour, keeping the default: {e:#}"),
        }
        let camera = &self.config.camera;
        ctx.projection = Projection::new(
            ctx.viewport.aspect(),
            Deg(camera.fov),
            camera.near,
            camera.far,
        );
        ctx.camera.rig = self.driver.rig;
        self.viewport_height = ctx.viewport.height;
        ctx.light.set(scene_light(), &ctx.queue);

        let loads = Slot::ALL
            .into_iter()
            .map(|slot| {
                load_entity(
                    slot,
                    slot.path(&self.config.assets).to_string(),
                    self.init.device.clone(),
                    self.init.queue.clone(),
                )
            })
            .collect();
        Out::FutEvent(loads)
    }

    fn on_ui(&mut self, ui: &egui::Context, _: &mut InputState) {
        egui::Window::new("Parameters")
            .resizable(false)
            .default_pos([16.0, 16.0])
            .show(ui, |ui| self.panel.ui(ui, &mut self.palette));
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut InputState,
        dt: instant::Duration,
    ) -> Out<SceneEvent> {
        self.driver.advance(
            dt.as_secs_f32(),
            state,
            ctx.viewport.height,
            &mut self.entities,
            &mut self.sections,
            &mut self.tweens,
        );

        for entity in self.entities.loaded_mut() {
            entity.apply_pose();
            entity.write_to_buffers(&ctx.queue, &ctx.device);
        }
        self.composed.write_sections(&self.sections, &ctx.queue);
        if self.palette.take_dirty() {
            self.composed.apply_palette(&self.palette, &ctx.queue);
        }

        let rig = self.driver.rig;
        Out::Configure(Box::new(move |ctx| ctx.camera.rig = rig))
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut InputState,
        _: &DeviceEvent,
    ) -> Out<SceneEvent> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        ctx: &Context,
        state: &mut InputState,
        event: &WindowEvent,
    ) -> Out<SceneEvent> {
        let height = ctx.viewport.height;
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                state.cursor.track(position.x, position.y, &ctx.viewport);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Character(c),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } if c.eq_ignore_ascii_case(SWATCH_KEY) => {
                self.panel.next_swatch(&mut self.palette);
            }
            // The offset is measured in viewport heights, keep the position within the section.
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                state
                    .scroll
                    .rescale(self.viewport_height, height, self.sections.len());
                self.viewport_height = height;
            }
            _ => {
                if let Some(input) = ScrollInput::from_window_event(event, &ctx.viewport) {
                    self.scroll(state, input, height);
                }
            }
        }
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        _: &Context,
        _: &mut InputState,
        event: SceneEvent,
    ) -> Option<SceneEvent> {
        match event {
            SceneEvent::Loaded { slot, result } => {
                self.entities.resolve(slot, result);
                None
            }
        }
    }

    fn on_render(&self) -> Render<'_> {
        let mut renders: Vec<Render<'_>> = self
            .entities
            .loaded()
            .map(|entity| Render::from(entity.node.as_ref()))
            .collect();
        renders.push(self.composed.render());
        Render::Composed(renders)
    }
}
