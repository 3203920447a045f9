//! Perspective camera.
//!
//! Right-handed, +Y up, looking down -Z by default. The projection matrix is
//! cached and only rebuilt by [`PerspectiveCamera::update_projection_matrix`],
//! so callers changing `fov`, `aspect`, `near` or `far` must call it.

use glam::{Mat4, Vec3};

#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub up: Vec3,
    target: Vec3,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            fov,
            aspect,
            near,
            far,
            position: Vec3::ZERO,
            up: Vec3::Y,
            target: Vec3::NEG_Z,
            projection: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    /// Orient the camera toward a world-space point.
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Rebuild the cached projection from the current frustum parameters.
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect.max(1e-6),
            self.near,
            self.far,
        );
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        // Degenerate when looking straight along `up`; fall back to +Z up.
        let dir = (self.target - self.position).normalize_or_zero();
        let up = if dir.cross(self.up).length_squared() < 1e-12 { Vec3::Z } else { self.up };
        Mat4::look_at_rh(self.position, self.target, up)
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}
