pub mod camera;
pub mod tree;

use glam::Vec3;

use crate::anim::Animator;
use crate::robot::{walk, Robot};

use self::camera::{ActiveCamera, FlyCamera, OrbitCamera};
use self::tree::Tree;

/// Half-extent of the square ground plane.
pub const GROUND_SIZE: f32 = 10.0;
/// Ground plane height.
pub const GROUND_HEIGHT: f32 = -1.0;

/// How many walk-cycle passes to enqueue before looping.
const WALK_PASSES: usize = 4;
/// Extra trees scattered around the fixed three.
const SCATTER_TREES: usize = 5;

/// Everything the app simulates and the renderer draws: the robot and its
/// animator, the static props, both cameras, and the view toggles. One
/// explicit context struct — no scene state lives in globals.
pub struct Scene {
    pub robot: Robot,
    pub animator: Animator,
    pub trees: Vec<Tree>,
    pub outer_camera: OrbitCamera,
    pub inner_camera: FlyCamera,
    pub active_camera: ActiveCamera,
    pub wireframe: bool,
    pub show_axes: bool,
    pub animate: bool,
}

impl Scene {
    pub fn new(rng: &mut fastrand::Rng) -> Self {
        let mut robot = Robot::new();
        walk::stance(&mut robot);

        let mut animator = Animator::new(true);
        for _ in 0..WALK_PASSES {
            animator.extend(walk::cycle());
        }
        animator.mark_baseline(&robot);

        let mut trees = vec![
            Tree::new(Vec3::new(-8.0, 0.0, -8.0)),
            Tree::new(Vec3::new(-8.0, 0.0, 8.0)),
            Tree::new(Vec3::new(8.0, 0.0, -8.0)),
        ];
        for _ in 0..SCATTER_TREES {
            // Keep the scatter clear of the robot's walking line.
            let side = if rng.bool() { 1.0 } else { -1.0 };
            let x = side * (4.0 + rng.f32() * 5.0);
            let z = (rng.f32() - 0.5) * 2.0 * GROUND_SIZE * 0.9;
            trees.push(
                Tree::new(Vec3::new(x, 0.0, z))
                    .with_yaw(rng.f32() * 360.0)
                    .with_scale(0.6 + rng.f32() * 0.5),
            );
        }

        Self {
            robot,
            animator,
            trees,
            outer_camera: OrbitCamera::new(1.50, 2.0, 14.0),
            inner_camera: FlyCamera::new(
                Vec3::new(5.0, 5.0, 5.0),
                -std::f32::consts::FRAC_PI_4,
                std::f32::consts::FRAC_PI_4,
            ),
            active_camera: ActiveCamera::Outer,
            wireframe: false,
            show_axes: true,
            animate: true,
        }
    }

    /// One simulation tick: advance the walk unless paused.
    pub fn tick(&mut self) {
        if self.animate {
            self.animator.tick(&mut self.robot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::PlayState;
    use crate::robot::Joint;

    #[test]
    fn scene_enqueues_full_walk() {
        let mut rng = fastrand::Rng::with_seed(7);
        let scene = Scene::new(&mut rng);
        assert_eq!(scene.animator.frame_count(), WALK_PASSES * 4);
        assert!(scene.animator.is_looping());
        assert_eq!(scene.robot.joint_angle(Joint::LeftHip), -30.0);
        assert!(scene.trees.len() >= 3);
    }

    #[test]
    fn tick_respects_pause_flag() {
        let mut rng = fastrand::Rng::with_seed(7);
        let mut scene = Scene::new(&mut rng);

        scene.animate = false;
        let before = scene.robot.pose();
        scene.tick();
        assert_eq!(scene.robot.pose(), before);
        assert_eq!(scene.animator.state(), PlayState::Unstarted);

        scene.animate = true;
        scene.tick();
        assert_eq!(scene.animator.state(), PlayState::Running);
        assert_ne!(scene.robot.pose(), before);
    }
}
