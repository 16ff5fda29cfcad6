//! Eased, additive rotation tweens.
//!
//! A tween owns a delta, not an end value: every advance adds the part of the
//! delta that the eased progress gained since the previous advance. Tweens on
//! the same target therefore stack, and other per-frame rotation changes on
//! the target are kept.

use cgmath::Vector3;

use crate::scene::entity::Pose;

/// Rotation delta (radians) a section mesh spins by when its section is reached.
pub const SECTION_SPIN: [f32; 3] = [6.0, 3.0, 1.5];
/// Duration of the section spin in seconds.
pub const SECTION_SPIN_SECS: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// Cubic ease-in-out.
    Power2InOut,
}

impl Ease {
    /// Map linear progress in `[0, 1]` to eased progress in `[0, 1]`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub target: usize,
    delta: Vector3<f32>,
    duration: f32,
    elapsed: f32,
    applied: f32,
    ease: Ease,
}

impl Tween {
    pub fn new(target: usize, delta: Vector3<f32>, duration: f32, ease: Ease) -> Self {
        Self {
            target,
            delta,
            duration,
            elapsed: 0.0,
            applied: 0.0,
            ease,
        }
    }

    /// Eased progress applied so far.
    pub fn progress(&self) -> f32 {
        self.applied
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Advance by `dt` seconds and return the rotation to add this step.
    fn step(&mut self, dt: f32) -> Vector3<f32> {
        self.elapsed += dt.max(0.0);
        let linear = if self.duration > 0.0 {
            self.elapsed / self.duration
        } else {
            1.0
        };
        let eased = self.ease.apply(linear);
        let gained = eased - self.applied;
        self.applied = eased;
        self.delta * gained
    }
}

/// The running tweens of a set of poses, addressed by index.
#[derive(Debug, Default)]
pub struct Tweens {
    active: Vec<Tween>,
}

impl Tweens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, tween: Tween) {
        log::debug!("Starting tween on target {}", tween.target);
        self.active.push(tween);
    }

    /// Spin the section mesh at `section` by [`SECTION_SPIN`].
    pub fn spin_section(&mut self, section: usize) {
        self.start(Tween::new(
            section,
            SECTION_SPIN.into(),
            SECTION_SPIN_SECS,
            Ease::Power2InOut,
        ));
    }

    /// Advance every tween and add its step to the rotation of its target.
    ///
    /// Tweens whose target does not exist are dropped. Finished tweens are
    /// removed after their last step.
    pub fn advance(&mut self, dt: f32, poses: &mut [Pose]) {
        self.active.retain_mut(|tween| {
            let Some(pose) = poses.get_mut(tween.target) else {
                log::warn!("Dropping tween for missing target {}", tween.target);
                return false;
            };
            pose.rotation += tween.step(dt);
            !tween.is_finished()
        });
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tween> {
        self.active.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn power2_in_out_is_symmetric_and_monotonic() {
        let ease = Ease::Power2InOut;
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(0.5), 0.5);
        assert_eq!(ease.apply(1.0), 1.0);
        assert_relative_eq!(ease.apply(0.25) + ease.apply(0.75), 1.0, epsilon = 1e-6);

        let samples: Vec<f32> = (0..=100).map(|i| ease.apply(i as f32 / 100.0)).collect();
        assert!(samples.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn progress_outside_the_unit_range_is_clamped() {
        assert_eq!(Ease::Power2InOut.apply(-1.0), 0.0);
        assert_eq!(Ease::Power2InOut.apply(3.0), 1.0);
    }

    #[test]
    fn finished_tween_applies_exactly_its_delta() {
        let mut poses = vec![Pose::default()];
        let mut tweens = Tweens::new();
        tweens.spin_section(0);

        for _ in 0..200 {
            tweens.advance(1.0 / 60.0, &mut poses);
        }

        assert!(tweens.is_empty());
        assert_relative_eq!(poses[0].rotation.x, 6.0, epsilon = 1e-4);
        assert_relative_eq!(poses[0].rotation.y, 3.0, epsilon = 1e-4);
        assert_relative_eq!(poses[0].rotation.z, 1.5, epsilon = 1e-4);
    }

    #[test]
    fn tweens_add_to_the_current_rotation() {
        let mut poses = vec![Pose::default(), Pose::default()];
        poses[1].rotation = Vector3::new(1.0, 1.0, 1.0);
        let mut tweens = Tweens::new();
        tweens.spin_section(1);
        tweens.spin_section(1);

        tweens.advance(10.0, &mut poses);

        assert_eq!(poses[0].rotation, Vector3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(poses[1].rotation.x, 13.0, epsilon = 1e-5);
        assert_relative_eq!(poses[1].rotation.z, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn half_way_is_half_the_delta() {
        let mut poses = vec![Pose::default()];
        let mut tweens = Tweens::new();
        tweens.spin_section(0);
        tweens.advance(SECTION_SPIN_SECS / 2.0, &mut poses);
        assert_relative_eq!(poses[0].rotation.x, 3.0, epsilon = 1e-5);
        assert_eq!(tweens.len(), 1);
    }

    #[test]
    fn tweens_for_missing_targets_are_dropped() {
        let mut poses = vec![Pose::default()];
        let mut tweens = Tweens::new();
        tweens.spin_section(7);
        tweens.advance(0.1, &mut poses);
        assert!(tweens.is_empty());
        assert_eq!(poses[0], Pose::default());
    }
}
