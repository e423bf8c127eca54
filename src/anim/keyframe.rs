use glam::Vec3;
use thiserror::Error;

use crate::robot::Joint;

/// Keyframe construction failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyframeError {
    /// The total deltas are divided by the duration every tick, so a
    /// keyframe must last at least one tick.
    #[error("keyframe duration must be at least one tick")]
    ZeroDuration,
}

/// One keyframe: the *total* change to apply to the pose over `duration`
/// ticks, not a per-tick increment. Immutable once built.
#[derive(Debug, Clone, Copy)]
pub struct Keyframe {
    joint_deltas: [f32; Joint::COUNT],
    position_delta: Vec3,
    rotation_delta: Vec3,
    pre_translation_delta: Vec3,
    duration: u32,
}

impl Keyframe {
    /// Start a keyframe lasting `duration` ticks. All deltas default to
    /// zero; populate with the `with_*` builders.
    pub fn new(duration: u32) -> Result<Self, KeyframeError> {
        if duration == 0 {
            return Err(KeyframeError::ZeroDuration);
        }
        Ok(Self {
            joint_deltas: [0.0; Joint::COUNT],
            position_delta: Vec3::ZERO,
            rotation_delta: Vec3::ZERO,
            pre_translation_delta: Vec3::ZERO,
            duration,
        })
    }

    /// Set the total rotation delta for one joint, in degrees.
    pub fn with_joint(mut self, joint: Joint, delta: f32) -> Self {
        self.joint_deltas[joint as usize] = delta;
        self
    }

    /// Set the total root-position delta.
    pub fn with_translation(mut self, delta: Vec3) -> Self {
        self.position_delta = delta;
        self
    }

    /// Set the total root-rotation delta, Euler degrees.
    pub fn with_rotation(mut self, delta: Vec3) -> Self {
        self.rotation_delta = delta;
        self
    }

    /// Set the total pre-rotation translation delta.
    pub fn with_pre_translation(mut self, delta: Vec3) -> Self {
        self.pre_translation_delta = delta;
        self
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn joint_delta(&self, joint: Joint) -> f32 {
        self.joint_deltas[joint as usize]
    }

    pub fn position_delta(&self) -> Vec3 {
        self.position_delta
    }

    pub fn rotation_delta(&self) -> Vec3 {
        self.rotation_delta
    }

    pub fn pre_translation_delta(&self) -> Vec3 {
        self.pre_translation_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_rejected() {
        assert_eq!(Keyframe::new(0).unwrap_err(), KeyframeError::ZeroDuration);
    }

    #[test]
    fn single_tick_duration_allowed() {
        let frame = Keyframe::new(1).unwrap();
        assert_eq!(frame.duration(), 1);
    }

    #[test]
    fn builder_populates_deltas() {
        let frame = Keyframe::new(30)
            .unwrap()
            .with_joint(Joint::LeftShoulder, -30.0)
            .with_joint(Joint::RightHip, 25.0)
            .with_translation(Vec3::new(0.0, 0.0, 0.75))
            .with_rotation(Vec3::new(0.0, 90.0, 0.0))
            .with_pre_translation(Vec3::new(0.0, -1.9, 0.0));

        assert_eq!(frame.joint_delta(Joint::LeftShoulder), -30.0);
        assert_eq!(frame.joint_delta(Joint::RightHip), 25.0);
        // Untouched joints stay at zero.
        assert_eq!(frame.joint_delta(Joint::LeftKnee), 0.0);
        assert_eq!(frame.position_delta(), Vec3::new(0.0, 0.0, 0.75));
        assert_eq!(frame.rotation_delta(), Vec3::new(0.0, 90.0, 0.0));
        assert_eq!(frame.pre_translation_delta(), Vec3::new(0.0, -1.9, 0.0));
    }
}
