//! Per-frame animation of the scene.

use cgmath::Vector2;
use rand::Rng;

use crate::{
    camera::CameraRig,
    config::SceneConfig,
    scene::{entity::Entities, entity::Pose, input::InputState, tween::Tweens},
};

/// Rotation added to the planet every frame, (x, y) in radians.
pub const PLANET_SPIN: [f32; 2] = [0.002, 0.001];
/// Upper bound of the random rotation jitter per axis and frame.
pub const JITTER: f32 = 0.005;
/// Angular rate of the figure's trajectory (rad/s).
pub const ORBIT_RATE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub objects_distance: f32,
    pub parallax_amplitude: f32,
    pub parallax_rate: f32,
    pub tan_limit: f32,
}

impl From<&SceneConfig> for FrameParams {
    fn from(config: &SceneConfig) -> Self {
        Self {
            objects_distance: config.scene.objects_distance,
            parallax_amplitude: config.camera.parallax_amplitude,
            parallax_rate: config.camera.parallax_rate,
            tan_limit: config.frame.tan_limit,
        }
    }
}

/// Timing of one advanced frame, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub elapsed: f32,
    pub delta: f32,
}

/// Position of the figure at `t` seconds.
///
/// The depth follows a tangent, which is clamped to `[-tan_limit, tan_limit]`
/// before scaling so the figure never flies off near the asymptotes.
pub fn figure_position(t: f32, tan_limit: f32) -> cgmath::Vector3<f32> {
    let phase = t * ORBIT_RATE;
    let limit = tan_limit.abs();
    cgmath::Vector3::new(
        phase.sin() * 2.0,
        phase.cos() * 1.5,
        phase.tan().clamp(-limit, limit) * 1.5,
    )
}

/// One exponential smoothing step of `current` towards `target`.
///
/// The factor is clamped to 1 so a long frame lands on the target instead of
/// overshooting it.
pub fn smooth_towards(
    current: Vector2<f32>,
    target: Vector2<f32>,
    rate: f32,
    dt: f32,
) -> Vector2<f32> {
    let factor = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * factor
}

/// Advances the animation clock and applies every per-frame change to the
/// entities, section meshes and camera rig.
#[derive(Debug)]
pub struct FrameDriver<R> {
    elapsed: f32,
    rng: R,
    params: FrameParams,
    pub rig: CameraRig,
}

impl<R: Rng> FrameDriver<R> {
    pub fn new(params: FrameParams, rig: CameraRig, rng: R) -> Self {
        Self {
            elapsed: 0.0,
            rng,
            params,
            rig,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn jitter(&mut self) -> f32 {
        JITTER * self.rng.random::<f32>()
    }

    /// Advance by `dt` seconds.
    ///
    /// `viewport_height` is the logical height the scroll offset is measured in.
    /// Section mesh tweens advance in the same step.
    pub fn advance(
        &mut self,
        dt: f32,
        input: &InputState,
        viewport_height: f32,
        entities: &mut Entities,
        sections: &mut [Pose],
        tweens: &mut Tweens,
    ) -> Frame {
        let delta = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.elapsed += delta;
        let t = self.elapsed;

        if let Some(planet) = entities.planet.get_mut() {
            planet.pose.rotation.x += PLANET_SPIN[0];
            planet.pose.rotation.y += PLANET_SPIN[1];
        }

        let (dy, dx) = (self.jitter(), self.jitter());
        if let Some(bally) = entities.bally.get_mut() {
            bally.pose.rotation.y += dy;
            bally.pose.rotation.x += dx;
            bally.pose.position = figure_position(t, self.params.tan_limit);
        }

        if viewport_height > 0.0 {
            self.rig.elevation =
                -input.scroll.scroll_y / viewport_height * self.params.objects_distance;
        }

        let amplitude = self.params.parallax_amplitude;
        let target = Vector2::new(input.cursor.x * amplitude, -input.cursor.y * amplitude);
        self.rig.offset = smooth_towards(self.rig.offset, target, self.params.parallax_rate, delta);

        if !sections.is_empty() {
            let jitter = [self.jitter(), self.jitter(), self.jitter()];
            let first = &mut sections[0];
            first.rotation.x += jitter[0];
            first.rotation.y += jitter[1];
            first.rotation.z += jitter[2];
        }

        tweens.advance(delta, sections);

        Frame { elapsed: t, delta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data_structures::scene_graph::ContainerNode,
        scene::{entity::Slot, entity::section_poses, input::CursorState},
    };
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::SmallRng};

    fn params() -> FrameParams {
        FrameParams::from(&SceneConfig::default())
    }

    fn driver() -> FrameDriver<SmallRng> {
        FrameDriver::new(params(), CameraRig::new(6.0), SmallRng::seed_from_u64(7))
    }

    #[test]
    fn tangent_term_is_bounded() {
        for i in 0..100_000 {
            let position = figure_position(i as f32 * 0.01, 4.0);
            assert!(position.z.abs() <= 6.0, "z = {} at step {i}", position.z);
        }
    }

    #[test]
    fn smoothing_never_overshoots() {
        let target = Vector2::new(0.25, -0.25);
        let mut offset = Vector2::new(0.0, 0.0);
        for _ in 0..50 {
            let next = smooth_towards(offset, target, 5.0, 1.0 / 60.0);
            assert!(next.x >= offset.x && next.x <= target.x);
            offset = next;
        }
        // one huge frame lands exactly on the target
        assert_eq!(smooth_towards(Vector2::new(0.0, 0.0), target, 5.0, 10.0), target);
    }

    #[test]
    fn scroll_moves_the_camera_down_one_distance_per_section() {
        let mut driver = driver();
        let mut input = InputState::default();
        input.scroll.scroll_y = 1600.0;
        driver.advance(
            0.016,
            &input,
            800.0,
            &mut Entities::default(),
            &mut section_poses(),
            &mut Tweens::new(),
        );
        assert_relative_eq!(driver.rig.elevation, -8.0);
    }

    #[test]
    fn frames_without_entities_only_touch_camera_and_sections() {
        let mut driver = driver();
        let mut sections = section_poses();
        let before = sections.clone();
        let input = InputState {
            cursor: CursorState { x: 0.5, y: -0.5 },
            ..Default::default()
        };
        let frame = driver.advance(
            0.1,
            &input,
            800.0,
            &mut Entities::default(),
            &mut sections,
            &mut Tweens::new(),
        );
        assert_relative_eq!(frame.elapsed, 0.1);
        assert!(driver.rig.offset.x > 0.0 && driver.rig.offset.y > 0.0);
        assert_ne!(sections[0].rotation, before[0].rotation);
        assert_eq!(sections[1..], before[1..]);
    }

    #[test]
    fn loaded_entities_are_animated() {
        let mut driver = driver();
        let mut entities = Entities::default();
        entities.resolve(Slot::Planet, Ok(Box::new(ContainerNode::new(1))));
        entities.resolve(Slot::Bally, Ok(Box::new(ContainerNode::new(1))));

        driver.advance(
            1.0,
            &InputState::default(),
            800.0,
            &mut entities,
            &mut section_poses(),
            &mut Tweens::new(),
        );

        let planet = entities.planet.get().unwrap().pose;
        assert_relative_eq!(planet.rotation.x, 0.002);
        assert_relative_eq!(planet.rotation.y, 0.001);
        let bally = entities.bally.get().unwrap().pose;
        assert_eq!(bally.position, figure_position(1.0, 4.0));
        assert!(bally.rotation.x >= 0.0 && bally.rotation.x < JITTER);
        assert_eq!(bally.scale, Slot::Bally.initial_pose().scale);
    }

    #[test]
    fn section_jitter_does_not_depend_on_the_figure_being_loaded() {
        let mut with_figure = Entities::default();
        with_figure.resolve(Slot::Bally, Ok(Box::new(ContainerNode::new(1))));
        let input = InputState::default();

        let run = |entities: &mut Entities| {
            let mut driver = driver();
            let mut sections = section_poses();
            for _ in 0..10 {
                driver.advance(0.016, &input, 800.0, entities, &mut sections, &mut Tweens::new());
            }
            sections
        };

        assert_eq!(run(&mut with_figure), run(&mut Entities::default()));
    }

    #[test]
    fn negative_or_invalid_deltas_do_not_rewind_time() {
        let mut driver = driver();
        let mut sections = section_poses();
        let mut tweens = Tweens::new();
        let input = InputState::default();
        driver.advance(0.5, &input, 800.0, &mut Entities::default(), &mut sections, &mut tweens);
        driver.advance(-1.0, &input, 800.0, &mut Entities::default(), &mut sections, &mut tweens);
        driver.advance(f32::NAN, &input, 800.0, &mut Entities::default(), &mut sections, &mut tweens);
        assert_relative_eq!(driver.elapsed(), 0.5);
    }
}
