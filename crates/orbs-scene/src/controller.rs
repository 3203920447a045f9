//! The scene controller: camera, sky-box, fifty orbiting spheres.
//!
//! Lifecycle: [`SceneSlot::init`] acquires the surface and builds the one
//! controller, then schedules the first frame. From there the host calls
//! [`SceneController::animate`] once per refresh, and each call requests the
//! next one. Pointer and resize handlers only update state; the next frame
//! picks it up.

use std::path::Path;
use std::sync::Arc;

use engine_core::glam::Vec3;
use engine_core::{
    CubeTexture, CubeTextureLoader, Mesh, MeshId, PerspectiveCamera, Scene, SphereGeometry,
    StandardMaterial, Viewport,
};
use orbs_surface::{RenderError, Renderer, SurfaceError};
use orbs_window::FrameScheduler;
use rand::Rng;

use crate::constants::*;
use crate::error::{Result, SceneError};
use crate::pointer::PointerOffset;

/// One orbiting sphere. Identity and scale are fixed at creation.
#[derive(Clone, Copy, Debug)]
pub struct AnimatedObject {
    mesh: MeshId,
    phase: usize,
    scale: f32,
}

impl AnimatedObject {
    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    /// Creation index, used to desynchronize motion.
    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

/// Orbit phase for a wall-clock time in milliseconds.
pub fn orbit_timer(now_ms: f64) -> f64 {
    TIME_SCALE * now_ms
}

/// In-plane position `(x, y)` of the object with phase index `phase`.
pub fn orbit_position(timer: f64, phase: usize) -> (f64, f64) {
    let i = phase as f64;
    (
        ORBIT_RADIUS * (timer + i).cos(),
        ORBIT_RADIUS * (timer + i * VERTICAL_PHASE_FACTOR).sin(),
    )
}

/// Milliseconds since the Unix epoch.
pub fn wall_clock_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

pub struct SceneController<R> {
    renderer: R,
    scene: Scene,
    camera: PerspectiveCamera,
    background: CubeTexture,
    objects: Vec<AnimatedObject>,
    pointer: PointerOffset,
    viewport: Viewport,
}

impl<R: Renderer> SceneController<R> {
    /// Build the scene around an already acquired renderer.
    ///
    /// The sky-box starts decoding in the background; construction never waits
    /// for it and never fails because of it. Only [`SceneSlot::init`] calls this.
    pub(crate) fn new(
        mut renderer: R,
        viewport: Viewport,
        sky_dir: &Path,
        rng: &mut impl Rng,
    ) -> Self {
        renderer.set_size(viewport.width, viewport.height);
        renderer.set_pixel_ratio(viewport.pixel_ratio);

        let background = CubeTextureLoader::new().with_path(sky_dir).load(SKYBOX_FACES);
        let mut scene = Scene::new();
        scene.background = Some(background.clone());

        let mut camera = PerspectiveCamera::new(
            CAMERA_FOV_DEG,
            viewport.aspect() as f32,
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        camera.position.z = CAMERA_DISTANCE;

        let geometry = Arc::new(SphereGeometry::new(
            SPHERE_RADIUS,
            SPHERE_WIDTH_SEGMENTS,
            SPHERE_HEIGHT_SEGMENTS,
        ));
        let material = Arc::new(
            StandardMaterial::new(SPHERE_METALNESS, SPHERE_ROUGHNESS)
                .with_env_map(background.clone()),
        );

        let objects = (0..SPHERE_COUNT)
            .map(|phase| {
                let mut mesh = Mesh::new(geometry.clone(), material.clone());
                mesh.position = Vec3::new(
                    rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
                    rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
                    rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
                );
                let scale = rng.gen_range(0.0..MAX_SCALE);
                mesh.scale = Vec3::splat(scale);
                AnimatedObject { mesh: scene.add(mesh), phase, scale }
            })
            .collect::<Vec<_>>();

        log::info!(
            "scene ready: {} spheres, viewport {}x{} @{}x",
            objects.len(),
            viewport.width,
            viewport.height,
            viewport.pixel_ratio
        );

        Self {
            renderer,
            scene,
            camera,
            background,
            objects,
            pointer: PointerOffset::default(),
            viewport,
        }
    }

    /// Register the first animation step with the host.
    pub fn start(&self, scheduler: &dyn FrameScheduler) {
        scheduler.request_frame();
    }

    /// Advance camera and objects to wall-clock time `now_ms`. No rendering.
    pub fn update(&mut self, now_ms: f64) {
        let timer = orbit_timer(now_ms);

        let target_x = self.pointer.x as f32;
        let target_y = -self.pointer.y as f32;
        self.camera.position.x += (target_x - self.camera.position.x) * CAMERA_EASING;
        self.camera.position.y += (target_y - self.camera.position.y) * CAMERA_EASING;
        self.camera.look_at(self.scene.position);

        for obj in &self.objects {
            let (x, y) = orbit_position(timer, obj.phase);
            let mesh = self.scene.mesh_mut(obj.mesh);
            mesh.position.x = x as f32;
            mesh.position.y = y as f32;
        }
    }

    /// One animation step: update, draw, then request the next step.
    pub fn animate(
        &mut self,
        now_ms: f64,
        scheduler: &dyn FrameScheduler,
    ) -> std::result::Result<(), RenderError> {
        self.update(now_ms);
        self.renderer.render(&self.scene, &self.camera)?;
        scheduler.request_frame();
        Ok(())
    }

    /// Viewport resized to logical `viewport.width` x `viewport.height`.
    pub fn on_resize(&mut self, viewport: Viewport) {
        self.viewport.width = viewport.width;
        self.viewport.height = viewport.height;
        self.renderer.set_size(viewport.width, viewport.height);
        if viewport.height > 0.0 {
            self.camera.aspect = (viewport.width / viewport.height) as f32;
            self.camera.update_projection_matrix();
        }
        log::debug!("resized to {}x{}", viewport.width, viewport.height);
    }

    /// Pointer moved to logical `(x, y)`.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.pointer = PointerOffset::from_pointer(x, y, &self.viewport);
    }

    /// Device pixel ratio changed (window moved between displays).
    pub fn on_pixel_ratio_changed(&mut self, ratio: f64) {
        self.viewport.pixel_ratio = ratio;
        self.renderer.set_pixel_ratio(ratio);
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn background(&self) -> &CubeTexture {
        &self.background
    }

    pub fn objects(&self) -> &[AnimatedObject] {
        &self.objects
    }

    pub fn object_position(&self, obj: &AnimatedObject) -> Vec3 {
        self.scene.mesh(obj.mesh).position
    }

    pub fn pointer(&self) -> PointerOffset {
        self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
}

/// Owner of the single scene controller.
///
/// Replaces a process-global instance: the entry point owns the slot and
/// hands out the controller by reference. [`SceneSlot::init`] is the only way
/// to build a controller:
///
/// ```compile_fail
/// use orbs_scene::SceneController;
/// use orbs_surface::Renderer;
///
/// fn build<R: Renderer>(renderer: R, rng: &mut rand::rngs::StdRng) -> SceneController<R> {
///     let viewport = engine_core::Viewport::new(800.0, 600.0, 1.0);
///     SceneController::new(renderer, viewport, std::path::Path::new("public"), rng)
/// }
/// ```
pub struct SceneSlot<R> {
    controller: Option<SceneController<R>>,
}

impl<R> Default for SceneSlot<R> {
    fn default() -> Self {
        Self { controller: None }
    }
}

impl<R: Renderer> SceneSlot<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the surface, build the controller and schedule its first frame.
    ///
    /// Fails with [`SceneError::AlreadyInitialized`] when a controller is live;
    /// `acquire` is not called in that case.
    pub fn init<F>(
        &mut self,
        acquire: F,
        viewport: Viewport,
        sky_dir: &Path,
        rng: &mut impl Rng,
        scheduler: &dyn FrameScheduler,
    ) -> Result<&mut SceneController<R>>
    where
        F: FnOnce() -> std::result::Result<R, SurfaceError>,
    {
        if self.controller.is_some() {
            log::error!("refusing to initialize a second scene controller");
            return Err(SceneError::AlreadyInitialized);
        }
        let renderer = acquire()?;
        let controller = self
            .controller
            .insert(SceneController::new(renderer, viewport, sky_dir, rng));
        controller.start(scheduler);
        Ok(controller)
    }

    pub fn get(&self) -> Option<&SceneController<R>> {
        self.controller.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut SceneController<R>> {
        self.controller.as_mut()
    }

    pub fn is_initialized(&self) -> bool {
        self.controller.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_at_time_zero() {
        assert_eq!(orbit_position(0.0, 0), (5.0, 0.0));
        let (x, y) = orbit_position(0.0, 10);
        assert!((x - 5.0 * 10f64.cos()).abs() < 1e-12);
        assert!((y - 5.0 * 11f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn timer_scales_milliseconds() {
        assert_eq!(orbit_timer(10_000.0), 1.0);
    }

    #[test]
    fn orbit_stays_on_radius_box() {
        let timer = orbit_timer(1_700_000_000_000.0);
        for i in 0..SPHERE_COUNT {
            let (x, y) = orbit_position(timer, i);
            assert!(x.abs() <= ORBIT_RADIUS && y.abs() <= ORBIT_RADIUS);
        }
    }
}
