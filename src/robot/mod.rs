pub mod rig;
pub mod walk;

use glam::Vec3;

/// The robot's moveable joints. Closed set — every joint maps to exactly
/// one angle, no dynamic insertion or removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Joint {
    LeftElbow = 0,
    LeftShoulder = 1,
    RightElbow = 2,
    RightShoulder = 3,
    LeftHip = 4,
    LeftKnee = 5,
    RightHip = 6,
    RightKnee = 7,
}

impl Joint {
    pub const COUNT: usize = 8;

    pub const ALL: [Joint; 8] = [
        Self::LeftElbow,
        Self::LeftShoulder,
        Self::RightElbow,
        Self::RightShoulder,
        Self::LeftHip,
        Self::LeftKnee,
        Self::RightHip,
        Self::RightKnee,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::LeftElbow => "L Elbow",
            Self::LeftShoulder => "L Shoulder",
            Self::RightElbow => "R Elbow",
            Self::RightShoulder => "R Shoulder",
            Self::LeftHip => "L Hip",
            Self::LeftKnee => "L Knee",
            Self::RightHip => "R Hip",
            Self::RightKnee => "R Knee",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Complete instantaneous state of the robot rig.
///
/// Copied by value for baseline snapshots — a snapshot shares no mutable
/// state with the live model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Per-joint rotation in degrees. Unconstrained — wrapping past ±360°
    /// is a rendering concern, not a model concern.
    pub joints: [f32; Joint::COUNT],
    /// Root position in world space.
    pub position: Vec3,
    /// Root rotation, Euler degrees applied X then Y then Z.
    pub rotation: Vec3,
    /// Offset applied before the root rotation, so the rotation can pivot
    /// about a point other than the geometric center.
    pub pre_translation: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            joints: [0.0; Joint::COUNT],
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            pre_translation: Vec3::ZERO,
        }
    }
}

impl Pose {
    /// Linear interpolation between two poses, for render-side smoothing
    /// between simulation ticks.
    pub fn lerp(&self, other: &Pose, alpha: f32) -> Pose {
        let mut joints = [0.0; Joint::COUNT];
        for (i, slot) in joints.iter_mut().enumerate() {
            *slot = self.joints[i] + (other.joints[i] - self.joints[i]) * alpha;
        }
        Pose {
            joints,
            position: self.position.lerp(other.position, alpha),
            rotation: self.rotation.lerp(other.rotation, alpha),
            pre_translation: self.pre_translation.lerp(other.pre_translation, alpha),
        }
    }
}

/// The articulated model. Pure bookkeeping — mutation operations plus a
/// cloneable snapshot of the full state. Drawing is the renderer's job;
/// it reads the pose each frame via [`Robot::pose`].
#[derive(Debug, Default)]
pub struct Robot {
    pose: Pose,
}

impl Robot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute set of a single joint angle.
    pub fn set_joint(&mut self, joint: Joint, angle: f32) {
        self.pose.joints[joint.index()] = angle;
    }

    /// Add a delta to a single joint angle.
    pub fn rotate_joint(&mut self, joint: Joint, delta: f32) {
        self.pose.joints[joint.index()] += delta;
    }

    pub fn joint_angle(&self, joint: Joint) -> f32 {
        self.pose.joints[joint.index()]
    }

    pub fn set_position(&mut self, v: Vec3) {
        self.pose.position = v;
    }

    pub fn translate(&mut self, v: Vec3) {
        self.pose.position += v;
    }

    pub fn set_rotation(&mut self, v: Vec3) {
        self.pose.rotation = v;
    }

    pub fn rotate(&mut self, v: Vec3) {
        self.pose.rotation += v;
    }

    pub fn set_pre_translation(&mut self, v: Vec3) {
        self.pose.pre_translation = v;
    }

    pub fn pre_translate(&mut self, v: Vec3) {
        self.pose.pre_translation += v;
    }

    /// Independent copy of the full pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Wholesale pose restore, used for baseline resets.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joint_mutation_accumulates() {
        let mut robot = Robot::new();
        robot.set_joint(Joint::LeftShoulder, 30.0);
        robot.rotate_joint(Joint::LeftShoulder, -10.0);
        assert_eq!(robot.joint_angle(Joint::LeftShoulder), 20.0);

        // Angles are allowed past a full turn.
        robot.rotate_joint(Joint::LeftShoulder, 700.0);
        assert_eq!(robot.joint_angle(Joint::LeftShoulder), 720.0);
    }

    #[test]
    fn snapshot_is_independent() {
        let mut robot = Robot::new();
        robot.set_joint(Joint::RightKnee, 15.0);
        robot.set_position(Vec3::new(0.0, -1.0, -6.0));

        let saved = robot.pose();

        robot.rotate_joint(Joint::RightKnee, 99.0);
        robot.translate(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(saved.joints[Joint::RightKnee as usize], 15.0);
        assert_eq!(saved.position, Vec3::new(0.0, -1.0, -6.0));

        robot.set_pose(saved);
        assert_eq!(robot.joint_angle(Joint::RightKnee), 15.0);
        assert_eq!(robot.pose(), saved);
    }

    #[test]
    fn pose_lerp_midpoint() {
        let mut a = Pose::default();
        let mut b = Pose::default();
        a.joints[0] = 10.0;
        b.joints[0] = 20.0;
        b.position = Vec3::new(2.0, 0.0, 4.0);

        let mid = a.lerp(&b, 0.5);
        assert_eq!(mid.joints[0], 15.0);
        assert_eq!(mid.position, Vec3::new(1.0, 0.0, 2.0));
    }
}
