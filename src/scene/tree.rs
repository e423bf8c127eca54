use glam::{Mat4, Vec3};

/// Trunk block dimensions.
const TRUNK_SCALE: Vec3 = Vec3::new(2.0, 4.3, 2.0);
const TRUNK_OFFSET: Vec3 = Vec3::new(0.0, 1.2, 0.0);
/// Leaf canopy sitting on the trunk.
const CANOPY_SCALE: Vec3 = Vec3::new(3.4, 2.4, 3.4);
const CANOPY_OFFSET: Vec3 = Vec3::new(0.0, 4.4, 0.0);

/// A static prop: blocky tree with a trunk and a leaf canopy. Placed once
/// at scene setup, never animated.
#[derive(Debug, Clone, Copy)]
pub struct Tree {
    pub position: Vec3,
    /// Euler degrees, applied X then Y then Z.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Tree {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn with_yaw(mut self, degrees: f32) -> Self {
        self.rotation.y = degrees;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    fn base_transform(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_x(self.rotation.x.to_radians())
            * Mat4::from_rotation_y(self.rotation.y.to_radians())
            * Mat4::from_rotation_z(self.rotation.z.to_radians())
            * Mat4::from_scale(self.scale)
    }

    /// World transforms for the two cubes: trunk then canopy.
    pub fn parts(&self) -> [Mat4; 2] {
        let base = self.base_transform();
        [
            base * Mat4::from_translation(TRUNK_OFFSET) * Mat4::from_scale(TRUNK_SCALE),
            base * Mat4::from_translation(CANOPY_OFFSET) * Mat4::from_scale(CANOPY_SCALE),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canopy_sits_above_trunk() {
        let tree = Tree::new(Vec3::new(-8.0, 0.0, -8.0));
        let [trunk, canopy] = tree.parts();
        let trunk_center = trunk.transform_point3(Vec3::ZERO);
        let canopy_center = canopy.transform_point3(Vec3::ZERO);
        assert!(canopy_center.y > trunk_center.y);
        assert_eq!(trunk_center.x, -8.0);
    }

    #[test]
    fn scale_shrinks_both_parts() {
        let small = Tree::new(Vec3::ZERO).with_scale(0.5);
        let [trunk, _] = small.parts();
        let top = trunk.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        // Full-size trunk tops out at 1.2 + 4.3/2; the half-size one at half that.
        assert!((top.y - (1.2 + 4.3 / 2.0) * 0.5).abs() < 1e-5);
    }
}
