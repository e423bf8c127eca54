//! Forward kinematics: maps a [`Pose`] to world transforms for the ten
//! rigid body parts the renderer draws. Pivot offsets and part dimensions
//! define the rig; the pose supplies every angle.

use glam::{Mat4, Vec3};

use crate::robot::{Joint, Pose};

/// Which base mesh a part is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Unit cube, centered at the origin.
    Cube,
    /// Sphere of diameter 1, centered at the origin.
    Sphere,
}

/// One renderable body part: full world transform (scale included) plus
/// the mesh to draw it with.
#[derive(Debug, Clone, Copy)]
pub struct Part {
    pub transform: Mat4,
    pub shape: Shape,
}

pub const PART_COUNT: usize = 10;

/// Limb segment cross-section and length.
const LIMB_SCALE: Vec3 = Vec3::new(0.4, 0.85, 0.4);
/// Torso block.
const TORSO_SCALE: Vec3 = Vec3::new(1.0, 1.5, 1.0);

/// Root transform: position, then rotation (X, Y, Z), then the
/// pre-rotation offset, so the rotation pivots about the offset point
/// rather than the model center.
pub fn root_transform(pose: &Pose) -> Mat4 {
    let rot = pose.rotation;
    Mat4::from_translation(pose.position)
        * Mat4::from_rotation_x(rot.x.to_radians())
        * Mat4::from_rotation_y(rot.y.to_radians())
        * Mat4::from_rotation_z(rot.z.to_radians())
        * Mat4::from_translation(pose.pre_translation)
}

/// Compute world transforms for all body parts from a pose.
pub fn body_parts(pose: &Pose) -> [Part; PART_COUNT] {
    let root = root_transform(pose);
    let angle = |joint: Joint| pose.joints[joint as usize].to_radians();

    let head = root * Mat4::from_translation(Vec3::new(0.0, 3.75, 0.0));

    let torso = root
        * Mat4::from_translation(Vec3::new(0.0, 2.5, 0.0))
        * Mat4::from_scale(TORSO_SCALE);

    // Arms hang from the shoulder pivots beside the torso; the elbow pivot
    // sits half a segment below the shoulder. All limb joints bend about X.
    let arm = |side: f32, shoulder: Joint, elbow: Joint| {
        let upper_pivot = root
            * Mat4::from_translation(Vec3::new(side * 0.35, 2.85, 0.0))
            * Mat4::from_rotation_x(angle(shoulder))
            * Mat4::from_translation(Vec3::new(side * 0.35, 0.0, 0.0));
        let lower_pivot = upper_pivot
            * Mat4::from_translation(Vec3::new(0.0, -0.5, 0.0))
            * Mat4::from_rotation_x(angle(elbow))
            * Mat4::from_translation(Vec3::new(0.0, -0.35, 0.0));
        (
            upper_pivot * Mat4::from_scale(LIMB_SCALE),
            lower_pivot * Mat4::from_scale(LIMB_SCALE),
        )
    };

    let leg = |side: f32, hip: Joint, knee: Joint| {
        let thigh_pivot = root
            * Mat4::from_translation(Vec3::new(side * 0.3, 1.75, 0.0))
            * Mat4::from_rotation_x(angle(hip))
            * Mat4::from_translation(Vec3::new(0.0, -0.4, 0.0));
        let shin_pivot = thigh_pivot
            * Mat4::from_translation(Vec3::new(0.0, -0.5, 0.0))
            * Mat4::from_rotation_x(angle(knee))
            * Mat4::from_translation(Vec3::new(0.0, -0.35, 0.0));
        (
            thigh_pivot * Mat4::from_scale(LIMB_SCALE),
            shin_pivot * Mat4::from_scale(LIMB_SCALE),
        )
    };

    let (l_upper_arm, l_lower_arm) = arm(1.0, Joint::LeftShoulder, Joint::LeftElbow);
    let (r_upper_arm, r_lower_arm) = arm(-1.0, Joint::RightShoulder, Joint::RightElbow);
    let (l_thigh, l_shin) = leg(1.0, Joint::LeftHip, Joint::LeftKnee);
    let (r_thigh, r_shin) = leg(-1.0, Joint::RightHip, Joint::RightKnee);

    [
        Part { transform: head, shape: Shape::Sphere },
        Part { transform: torso, shape: Shape::Cube },
        Part { transform: l_upper_arm, shape: Shape::Cube },
        Part { transform: l_lower_arm, shape: Shape::Cube },
        Part { transform: r_upper_arm, shape: Shape::Cube },
        Part { transform: r_lower_arm, shape: Shape::Cube },
        Part { transform: l_thigh, shape: Shape::Cube },
        Part { transform: l_shin, shape: Shape::Cube },
        Part { transform: r_thigh, shape: Shape::Cube },
        Part { transform: r_shin, shape: Shape::Cube },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part_center(part: &Part) -> Vec3 {
        part.transform.transform_point3(Vec3::ZERO)
    }

    #[test]
    fn root_position_moves_every_part() {
        let neutral = Pose::default();
        let mut moved = Pose::default();
        moved.position = Vec3::new(2.0, 0.0, -5.0);

        let a = body_parts(&neutral);
        let b = body_parts(&moved);
        for (pa, pb) in a.iter().zip(b.iter()) {
            let delta = part_center(pb) - part_center(pa);
            assert!((delta - moved.position).length() < 1e-5);
        }
    }

    #[test]
    fn shoulder_bend_leaves_head_in_place() {
        let neutral = Pose::default();
        let mut bent = Pose::default();
        bent.joints[Joint::LeftShoulder as usize] = 90.0;

        let a = body_parts(&neutral);
        let b = body_parts(&bent);
        // Head (part 0) unaffected, left lower arm (part 3) swings.
        assert!((part_center(&a[0]) - part_center(&b[0])).length() < 1e-5);
        assert!((part_center(&a[3]) - part_center(&b[3])).length() > 0.1);
    }

    #[test]
    fn pre_translation_shifts_the_rotation_pivot() {
        let mut spun = Pose::default();
        spun.rotation = Vec3::new(0.0, 180.0, 0.0);

        let mut offset_spun = spun;
        offset_spun.pre_translation = Vec3::new(0.0, 0.0, 1.0);

        // With the offset, the 180° yaw lands the head at z = -1 instead
        // of back at the origin plane.
        let plain = body_parts(&spun);
        let offset = body_parts(&offset_spun);
        let dz = part_center(&offset[0]).z - part_center(&plain[0]).z;
        assert!((dz - (-1.0)).abs() < 1e-4);
    }

    #[test]
    fn part_inventory() {
        let parts = body_parts(&Pose::default());
        let spheres = parts.iter().filter(|p| p.shape == Shape::Sphere).count();
        assert_eq!(spheres, 1);
        assert_eq!(parts.len(), PART_COUNT);
    }
}
