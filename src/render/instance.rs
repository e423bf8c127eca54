use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::robot::rig::{self, Shape};
use crate::robot::Pose;
use crate::scene::camera::FlyCamera;
use crate::scene::{Scene, GROUND_HEIGHT, GROUND_SIZE};

/// Pack RGB into the instance color word (alpha fixed at 255).
const fn rgb(r: u32, g: u32, b: u32) -> u32 {
    (r << 24) | (g << 16) | (b << 8) | 0xFF
}

const HEAD_COLOR: u32 = rgb(230, 180, 140);
const SHIRT_COLOR: u32 = rgb(60, 110, 220);
const PANTS_COLOR: u32 = rgb(45, 70, 150);
const TRUNK_COLOR: u32 = rgb(110, 75, 40);
const CANOPY_COLOR: u32 = rgb(60, 140, 50);
const GROUND_COLOR: u32 = rgb(90, 160, 70);
const GIZMO_COLOR: u32 = rgb(0, 255, 0);

/// Per-instance data for one solid body part or prop.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PartInstance {
    pub model: [[f32; 4]; 4],
    pub color: u32,
    pub _pad: [u32; 3],
}

impl PartInstance {
    pub fn new(transform: Mat4, color: u32) -> Self {
        Self {
            model: transform.to_cols_array_2d(),
            color,
            _pad: [0; 3],
        }
    }
}

/// One endpoint of a debug line (axes, camera gizmo).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: u32,
}

/// CPU-side staging for everything drawn this frame. Rebuilt per frame,
/// allocations reused.
#[derive(Default)]
pub struct FrameInstances {
    pub cubes: Vec<PartInstance>,
    pub spheres: Vec<PartInstance>,
    /// Axes first, then the camera gizmo; the gizmo tail is only drawn in
    /// the outer view so it never obscures the inner camera's own output.
    pub lines: Vec<LineVertex>,
    pub shared_line_count: u32,
}

impl FrameInstances {
    pub fn clear(&mut self) {
        self.cubes.clear();
        self.spheres.clear();
        self.lines.clear();
        self.shared_line_count = 0;
    }

    /// Stage the whole scene, drawing the robot at `pose` (the app passes
    /// the render-interpolated pose, not the raw simulation pose).
    pub fn stage(&mut self, scene: &Scene, pose: &Pose) {
        self.clear();

        // Ground slab.
        self.cubes.push(PartInstance::new(
            Mat4::from_translation(Vec3::new(0.0, GROUND_HEIGHT - 0.05, 0.0))
                * Mat4::from_scale(Vec3::new(GROUND_SIZE * 2.0, 0.1, GROUND_SIZE * 2.0)),
            GROUND_COLOR,
        ));

        for tree in &scene.trees {
            let [trunk, canopy] = tree.parts();
            self.cubes.push(PartInstance::new(trunk, TRUNK_COLOR));
            self.cubes.push(PartInstance::new(canopy, CANOPY_COLOR));
        }

        for (i, part) in rig::body_parts(pose).iter().enumerate() {
            let color = match i {
                0 => HEAD_COLOR,
                1..=5 => SHIRT_COLOR,
                _ => PANTS_COLOR,
            };
            match part.shape {
                Shape::Cube => self.cubes.push(PartInstance::new(part.transform, color)),
                Shape::Sphere => self.spheres.push(PartInstance::new(part.transform, color)),
            }
        }

        if scene.show_axes {
            self.stage_axes();
        }
        self.shared_line_count = self.lines.len() as u32;
        self.stage_camera_gizmo(&scene.inner_camera);
    }

    /// World axes through the origin, three units long.
    fn stage_axes(&mut self) {
        let axes = [
            (Vec3::new(3.0, 0.0, 0.0), rgb(255, 40, 40)),
            (Vec3::new(0.0, 3.0, 0.0), rgb(40, 255, 40)),
            (Vec3::new(0.0, 0.0, 3.0), rgb(40, 40, 255)),
        ];
        for (end, color) in axes {
            self.push_line(Vec3::ZERO, end, color);
        }
    }

    /// Wire box at the inner camera's position plus a short view-direction
    /// stalk, so the outer view shows where the inset is looking.
    fn stage_camera_gizmo(&mut self, camera: &FlyCamera) {
        let body = Mat4::from_translation(camera.position)
            * Mat4::from_rotation_y(-camera.theta)
            * Mat4::from_scale(Vec3::new(2.0, 0.5, 1.5));
        self.push_wire_cube(body, GIZMO_COLOR);
        self.push_line(
            camera.position,
            camera.position + camera.direction() * 1.5,
            GIZMO_COLOR,
        );
    }

    fn push_line(&mut self, from: Vec3, to: Vec3, color: u32) {
        self.lines.push(LineVertex { position: from.into(), color });
        self.lines.push(LineVertex { position: to.into(), color });
    }

    /// The twelve edges of a unit cube under `transform`.
    fn push_wire_cube(&mut self, transform: Mat4, color: u32) {
        const H: f32 = 0.5;
        let corner = |x: f32, y: f32, z: f32| transform.transform_point3(Vec3::new(x, y, z));
        let c = [
            corner(-H, -H, -H),
            corner(H, -H, -H),
            corner(H, -H, H),
            corner(-H, -H, H),
            corner(-H, H, -H),
            corner(H, H, -H),
            corner(H, H, H),
            corner(-H, H, H),
        ];
        const EDGES: [(usize, usize); 12] = [
            (0, 1), (1, 2), (2, 3), (3, 0), // bottom
            (4, 5), (5, 6), (6, 7), (7, 4), // top
            (0, 4), (1, 5), (2, 6), (3, 7), // uprights
        ];
        for (a, b) in EDGES {
            self.push_line(c[a], c[b], color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::rig::PART_COUNT;

    #[test]
    fn stage_covers_scene_inventory() {
        let mut rng = fastrand::Rng::with_seed(3);
        let scene = Scene::new(&mut rng);
        let pose = scene.robot.pose();

        let mut frame = FrameInstances::default();
        frame.stage(&scene, &pose);

        // Ground + two cubes per tree + nine robot cubes; the head is the
        // lone sphere.
        assert_eq!(
            frame.cubes.len(),
            1 + scene.trees.len() * 2 + (PART_COUNT - 1)
        );
        assert_eq!(frame.spheres.len(), 1);

        // Axes shown by default: three shared lines before the gizmo tail.
        assert_eq!(frame.shared_line_count, 6);
        assert!(frame.lines.len() as u32 > frame.shared_line_count);
    }

    #[test]
    fn axes_can_be_hidden() {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut scene = Scene::new(&mut rng);
        scene.show_axes = false;
        let pose = scene.robot.pose();

        let mut frame = FrameInstances::default();
        frame.stage(&scene, &pose);
        assert_eq!(frame.shared_line_count, 0);
    }
}
