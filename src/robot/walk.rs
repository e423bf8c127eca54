//! The canonical straight-line walk cycle: four keyframes of 30 ticks each,
//! arms and legs counter-swinging, with a steady forward drift on Z.

use glam::Vec3;

use crate::anim::Keyframe;
use crate::robot::{Joint, Robot};

/// Ticks per walk keyframe.
pub const FRAME_TICKS: u32 = 30;

/// Forward drift per keyframe.
const STRIDE: Vec3 = Vec3::new(0.0, 0.0, 0.75);

/// Put the robot into the mid-stride stance the cycle starts from.
pub fn stance(robot: &mut Robot) {
    robot.set_position(Vec3::new(0.0, -1.0, -6.0));
    robot.rotate_joint(Joint::LeftElbow, -20.0);
    robot.rotate_joint(Joint::LeftShoulder, 30.0);
    robot.rotate_joint(Joint::RightElbow, -20.0);
    robot.rotate_joint(Joint::RightShoulder, -30.0);
    robot.rotate_joint(Joint::LeftHip, -30.0);
    robot.rotate_joint(Joint::LeftKnee, 5.0);
    robot.rotate_joint(Joint::RightHip, 20.0);
}

/// One pass of the walk cycle. Net joint delta over the four frames is zero
/// for every joint — the pose lands back on the stance, advanced by four
/// strides.
pub fn cycle() -> Vec<Keyframe> {
    let frame = |ticks| Keyframe::new(ticks).expect("walk keyframes last a full stride");

    vec![
        frame(FRAME_TICKS)
            .with_joint(Joint::LeftShoulder, -30.0)
            .with_joint(Joint::RightShoulder, 30.0)
            .with_joint(Joint::LeftHip, 25.0)
            .with_joint(Joint::LeftKnee, -5.0)
            .with_joint(Joint::RightHip, -25.0)
            .with_joint(Joint::RightKnee, 40.0)
            .with_translation(STRIDE),
        frame(FRAME_TICKS)
            .with_joint(Joint::LeftShoulder, -30.0)
            .with_joint(Joint::RightShoulder, 30.0)
            .with_joint(Joint::LeftHip, 25.0)
            .with_joint(Joint::RightHip, -25.0)
            .with_joint(Joint::RightKnee, -35.0)
            .with_translation(STRIDE),
        frame(FRAME_TICKS)
            .with_joint(Joint::LeftShoulder, 30.0)
            .with_joint(Joint::RightShoulder, -30.0)
            .with_joint(Joint::LeftHip, -25.0)
            .with_joint(Joint::LeftKnee, 40.0)
            .with_joint(Joint::RightHip, 25.0)
            .with_joint(Joint::RightKnee, -5.0)
            .with_translation(STRIDE),
        frame(FRAME_TICKS)
            .with_joint(Joint::LeftShoulder, 30.0)
            .with_joint(Joint::RightShoulder, -30.0)
            .with_joint(Joint::LeftHip, -25.0)
            .with_joint(Joint::LeftKnee, -35.0)
            .with_joint(Joint::RightHip, 25.0)
            .with_translation(STRIDE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_has_zero_net_joint_delta() {
        let frames = cycle();
        for joint in Joint::ALL {
            let net: f32 = frames.iter().map(|f| f.joint_delta(joint)).sum();
            assert_eq!(net, 0.0, "{} drifts over one cycle", joint.label());
        }
    }

    #[test]
    fn cycle_advances_three_units_forward() {
        let net: Vec3 = cycle().iter().map(|f| f.position_delta()).sum();
        assert_eq!(net, Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn stance_is_asymmetric_mid_stride() {
        let mut robot = Robot::new();
        stance(&mut robot);
        assert_eq!(robot.joint_angle(Joint::LeftHip), -30.0);
        assert_eq!(robot.joint_angle(Joint::RightHip), 20.0);
        assert_eq!(robot.pose().position, Vec3::new(0.0, -1.0, -6.0));
    }
}
