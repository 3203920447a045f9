//! Compiled-in scene constants.

pub const SPHERE_COUNT: usize = 50;
pub const SPHERE_RADIUS: f32 = 0.1;
pub const SPHERE_WIDTH_SEGMENTS: u32 = 32;
pub const SPHERE_HEIGHT_SEGMENTS: u32 = 16;
pub const SPHERE_METALNESS: f32 = 1.0;
pub const SPHERE_ROUGHNESS: f32 = 0.0;
/// Initial positions are drawn from `[-SPAWN_EXTENT, SPAWN_EXTENT)` per axis.
pub const SPAWN_EXTENT: f32 = 5.0;
/// Uniform scale is drawn from `[0, MAX_SCALE)`.
pub const MAX_SCALE: f32 = 5.0;

pub const CAMERA_FOV_DEG: f32 = 60.0;
pub const CAMERA_NEAR: f32 = 0.01;
pub const CAMERA_FAR: f32 = 100.0;
pub const CAMERA_DISTANCE: f32 = 3.0;
/// Fraction of the remaining distance the camera covers each frame.
pub const CAMERA_EASING: f32 = 0.05;

pub const ORBIT_RADIUS: f64 = 5.0;
/// Wall-clock milliseconds to orbit phase.
pub const TIME_SCALE: f64 = 0.0001;
/// Per-index phase multiplier on the vertical axis.
pub const VERTICAL_PHASE_FACTOR: f64 = 1.1;
/// Logical pixels per unit of pointer offset.
pub const POINTER_DIVISOR: f64 = 100.0;

/// Sky-box directory, relative to the asset root.
pub const SKYBOX_DIR: &str = "/maps/swedishcastle/";
pub const SKYBOX_FACES: [&str; 6] = ["px.jpg", "nx.jpg", "py.jpg", "ny.jpg", "pz.jpg", "nz.jpg"];
