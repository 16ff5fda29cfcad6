use rand::{SeedableRng, rngs::SmallRng};
use scroll_flow::{
    camera::CameraRig,
    config::SceneConfig,
    scene::{
        entity::{Entities, Pose, section_poses},
        frame::{Frame, FrameDriver, FrameParams},
        input::{InputState, ScrollInput},
        tween::Tweens,
    },
};

pub const HEIGHT: f32 = 800.0;
pub const FRAME: f32 = 1.0 / 60.0;

/// The scene's CPU state driven without a window or GPU.
pub struct Scenario {
    pub config: SceneConfig,
    pub input: InputState,
    pub entities: Entities,
    pub sections: Vec<Pose>,
    pub tweens: Tweens,
    pub driver: FrameDriver<SmallRng>,
    pub height: f32,
}

impl Scenario {
    pub fn new() -> Self {
        let config = SceneConfig::default();
        let driver = FrameDriver::new(
            FrameParams::from(&config),
            CameraRig::new(config.camera.distance),
            SmallRng::seed_from_u64(2024),
        );
        Self {
            config,
            input: InputState::default(),
            entities: Entities::default(),
            sections: section_poses(),
            tweens: Tweens::new(),
            driver,
            height: HEIGHT,
        }
    }

    /// Scroll and start a spin if a new section was entered.
    pub fn scroll(&mut self, input: ScrollInput) -> Option<usize> {
        let entered = self.input.scroll.apply(
            input,
            self.config.scroll.line_height,
            self.height,
            self.sections.len(),
        );
        if let Some(section) = entered {
            self.tweens.spin_section(section);
        }
        entered
    }

    /// Resize the viewport the way the scene does, without spinning anything.
    pub fn resize(&mut self, height: f32) {
        self.input
            .scroll
            .rescale(self.height, height, self.sections.len());
        self.height = height;
    }

    pub fn frame(&mut self, dt: f32) -> Frame {
        self.driver.advance(
            dt,
            &self.input,
            self.height,
            &mut self.entities,
            &mut self.sections,
            &mut self.tweens,
        )
    }

    pub fn frames(&mut self, count: usize) {
        for _ in 0..count {
            self.frame(FRAME);
        }
    }
}
