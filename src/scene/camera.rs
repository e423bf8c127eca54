//! Dual-camera state: an orbiting outer camera pinned to the origin and a
//! free-flying inner camera shown in the corner inset.

use glam::{Mat4, Vec3};

/// Radians of orbit per pixel of mouse drag.
const DRAG_SENSITIVITY: f32 = 0.005;
/// Radius change per pixel of right-drag.
const ZOOM_SENSITIVITY: f32 = 0.01;
/// Keep polar angle strictly inside (0, PI) so the view never degenerates.
const PHI_EPSILON: f32 = 0.001;
/// Orbit radius limits — keeps the user from getting lost.
const RADIUS_MIN: f32 = 2.0;
const RADIUS_MAX: f32 = 20.0;
/// Fly-camera movement step is direction / MOVE_DIVISOR per key press.
const MOVE_DIVISOR: f32 = 5.0;

/// Vertical field of view for both cameras.
const FOV_Y_DEGREES: f32 = 45.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 1000.0;

/// Spherical (theta, phi, radius) to cartesian, with +Y up and theta = 0
/// looking down -Z.
fn spherical_to_cartesian(theta: f32, phi: f32, radius: f32) -> Vec3 {
    Vec3::new(
        radius * theta.sin() * phi.sin(),
        radius * -phi.cos(),
        radius * -theta.cos() * phi.sin(),
    )
}

/// Shared projection for both viewports.
pub fn perspective(aspect: f32) -> Mat4 {
    Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect, Z_NEAR, Z_FAR)
}

/// Which camera the keyboard and mouse currently control (and which one
/// fills the main viewport — the other renders the inset).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveCamera {
    Inner,
    Outer,
}

/// Orbits the world origin on a sphere.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub theta: f32,
    pub phi: f32,
    pub radius: f32,
}

impl OrbitCamera {
    pub fn new(theta: f32, phi: f32, radius: f32) -> Self {
        Self { theta, phi, radius }
    }

    pub fn position(&self) -> Vec3 {
        spherical_to_cartesian(self.theta, self.phi, self.radius)
    }

    /// Left-drag: orbit. Phi stays strictly inside (0, PI).
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.theta += dx * DRAG_SENSITIVITY;
        self.phi = (self.phi + dy * DRAG_SENSITIVITY)
            .clamp(PHI_EPSILON, std::f32::consts::PI - PHI_EPSILON);
    }

    /// Right-drag: move along the view ray, clamped to sane distances.
    pub fn zoom(&mut self, amount: f32) {
        self.radius = (self.radius + amount * ZOOM_SENSITIVITY).clamp(RADIUS_MIN, RADIUS_MAX);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), Vec3::ZERO, Vec3::Y)
    }
}

/// Free-flying camera: a position plus a spherical view direction.
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vec3,
    pub theta: f32,
    pub phi: f32,
}

impl FlyCamera {
    pub fn new(position: Vec3, theta: f32, phi: f32) -> Self {
        Self { position, theta, phi }
    }

    pub fn direction(&self) -> Vec3 {
        spherical_to_cartesian(self.theta, self.phi, 1.0).normalize()
    }

    /// Left-drag: look around. Vertical axis is inverted relative to the
    /// orbit camera so dragging up looks up.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.theta += dx * DRAG_SENSITIVITY;
        self.phi = (self.phi - dy * DRAG_SENSITIVITY)
            .clamp(PHI_EPSILON, std::f32::consts::PI - PHI_EPSILON);
    }

    /// Step forward (positive) or backward along the view direction.
    pub fn advance(&mut self, steps: f32) {
        self.position += self.direction() * (steps / MOVE_DIVISOR);
    }

    /// Step right (positive) or left, perpendicular to the view direction.
    pub fn strafe(&mut self, steps: f32) {
        let right = self.direction().cross(Vec3::Y);
        self.position += right * (steps / MOVE_DIVISOR);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.direction(), Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn spherical_axes() {
        // theta 0, phi PI/2: looking from -Z at the origin plane.
        let p = spherical_to_cartesian(0.0, FRAC_PI_2, 2.0);
        assert!((p - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);

        // phi near 0 points straight down.
        let down = spherical_to_cartesian(0.3, 0.0, 1.0);
        assert!((down - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn orbit_drag_clamps_phi() {
        let mut cam = OrbitCamera::new(0.0, FRAC_PI_2, 5.0);
        cam.drag(0.0, 1e6);
        assert!(cam.phi < PI);
        cam.drag(0.0, -1e6);
        assert!(cam.phi > 0.0);
    }

    #[test]
    fn orbit_zoom_clamps_radius() {
        let mut cam = OrbitCamera::new(0.0, FRAC_PI_2, 5.0);
        cam.zoom(1e6);
        assert_eq!(cam.radius, RADIUS_MAX);
        cam.zoom(-1e6);
        assert_eq!(cam.radius, RADIUS_MIN);
    }

    #[test]
    fn fly_advance_follows_view_direction() {
        let mut cam = FlyCamera::new(Vec3::ZERO, 0.0, FRAC_PI_2);
        let dir = cam.direction();
        cam.advance(5.0);
        assert!((cam.position - dir).length() < 1e-5);
    }

    #[test]
    fn fly_strafe_is_perpendicular() {
        let mut cam = FlyCamera::new(Vec3::ZERO, 0.0, FRAC_PI_2);
        cam.strafe(5.0);
        assert!(cam.position.dot(cam.direction()).abs() < 1e-5);
        assert!(cam.position.length() > 0.9);
    }
}
