use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use engine_core::{CubeStatus, PerspectiveCamera, Scene, Viewport, glam::Vec3, wgpu};
use orbs_scene::constants::*;
use orbs_scene::{SceneController, SceneError, SceneSlot, orbit_position, orbit_timer};
use orbs_surface::{RenderError, Renderer, SurfaceError};
use orbs_window::FrameScheduler;
use rand::SeedableRng;
use rand::rngs::StdRng;

type Log = Rc<RefCell<Vec<&'static str>>>;
type Slot = SceneSlot<FakeRenderer>;

struct FakeRenderer {
    size: (f64, f64),
    ratio: f64,
    frames: usize,
    fail: bool,
    last_camera: Option<Vec3>,
    log: Log,
}

impl FakeRenderer {
    fn new(log: Log) -> Self {
        Self { size: (0.0, 0.0), ratio: 1.0, frames: 0, fail: false, last_camera: None, log }
    }
}

impl Renderer for FakeRenderer {
    fn set_size(&mut self, width: f64, height: f64) {
        self.size = (width, height);
    }
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.ratio = ratio;
    }
    fn size(&self) -> (f64, f64) {
        self.size
    }
    fn pixel_ratio(&self) -> f64 {
        self.ratio
    }
    fn render(&mut self, _scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        self.log.borrow_mut().push("render");
        if self.fail {
            return Err(RenderError::Frame(wgpu::SurfaceError::Lost));
        }
        self.frames += 1;
        self.last_camera = Some(camera.position);
        Ok(())
    }
}

struct FakeScheduler {
    requests: Cell<usize>,
    log: Log,
}

impl FakeScheduler {
    fn new(log: Log) -> Self {
        Self { requests: Cell::new(0), log }
    }
}

impl FrameScheduler for FakeScheduler {
    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
        self.log.borrow_mut().push("schedule");
    }
}

fn missing_sky() -> &'static Path {
    Path::new("/nonexistent/skyorbs/maps/")
}

/// A slot holding a live controller built around `renderer`.
fn start(renderer: FakeRenderer, viewport: Viewport, sky_dir: &Path, seed: u64) -> Slot {
    let mut slot = SceneSlot::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let boot = FakeScheduler::new(Log::default());
    slot.init(|| Ok(renderer), viewport, sky_dir, &mut rng, &boot).expect("init");
    slot
}

fn controller(viewport: Viewport, seed: u64) -> Slot {
    start(FakeRenderer::new(Log::default()), viewport, missing_sky(), seed)
}

fn live(slot: &mut Slot) -> &mut SceneController<FakeRenderer> {
    slot.get_mut().expect("controller")
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}

#[test]
fn initial_state() {
    let mut slot = controller(Viewport::new(1280.0, 720.0, 2.0), 7);
    let c = live(&mut slot);

    assert_eq!(c.renderer().size(), (1280.0, 720.0));
    assert_eq!(c.renderer().pixel_ratio(), 2.0);
    assert_eq!(c.renderer().drawing_buffer_size(), (2560, 1440));

    let cam = c.camera();
    assert_eq!(cam.position, Vec3::new(0.0, 0.0, CAMERA_DISTANCE));
    assert_eq!(cam.fov, CAMERA_FOV_DEG);
    assert_eq!(cam.near, CAMERA_NEAR);
    assert_eq!(cam.far, CAMERA_FAR);
    assert!(close(cam.aspect, 1280.0 / 720.0));

    assert_eq!(c.objects().len(), SPHERE_COUNT);
    assert_eq!(c.scene().len(), SPHERE_COUNT);
    for (i, obj) in c.objects().iter().enumerate() {
        assert_eq!(obj.phase(), i);
        assert!((0.0..MAX_SCALE).contains(&obj.scale()));
        let p = c.object_position(obj);
        for v in [p.x, p.y, p.z] {
            assert!((-SPAWN_EXTENT..SPAWN_EXTENT).contains(&v));
        }
        assert_eq!(c.scene().mesh(obj.mesh()).scale, Vec3::splat(obj.scale()));
    }
}

#[test]
fn spheres_share_geometry_and_material() {
    let mut slot = controller(Viewport::new(800.0, 600.0, 1.0), 1);
    let c = live(&mut slot);
    let meshes = c.scene().meshes();
    let first = &meshes[0];
    assert_eq!(first.geometry.radius, SPHERE_RADIUS);
    assert_eq!(first.material.metalness, SPHERE_METALNESS);
    assert_eq!(first.material.roughness, SPHERE_ROUGHNESS);
    for m in meshes {
        assert_eq!(m.geometry.id(), first.geometry.id());
        assert_eq!(m.material.id(), first.material.id());
    }
    let env = first.material.env_map.as_ref().map(|t| t.id());
    assert_eq!(env, Some(c.background().id()));
    assert_eq!(c.scene().background.as_ref().map(|t| t.id()), Some(c.background().id()));
}

#[test]
fn missing_skybox_does_not_stop_animation() {
    let mut slot = controller(Viewport::new(800.0, 600.0, 1.0), 2);
    let c = live(&mut slot);
    assert_eq!(c.background().wait(std::time::Duration::from_secs(5)), CubeStatus::Failed);
    let log = Log::default();
    let sched = FakeScheduler::new(log);
    c.animate(1_000.0, &sched).expect("frame");
    assert_eq!(c.renderer().frames, 1);
    assert_eq!(sched.requests.get(), 1);
}

#[test]
fn objects_follow_orbit() {
    let mut slot = controller(Viewport::new(800.0, 600.0, 1.0), 3);
    let c = live(&mut slot);
    let initial_z: Vec<f32> = c.objects().iter().map(|o| c.object_position(o).z).collect();
    let now = 1_700_000_123_456.0;
    c.update(now);

    let timer = orbit_timer(now);
    for (obj, z) in c.objects().iter().zip(initial_z) {
        let (x, y) = orbit_position(timer, obj.phase());
        let p = c.object_position(obj);
        assert_eq!(p.x, x as f32);
        assert_eq!(p.y, y as f32);
        assert_eq!(p.z, z, "depth is never animated");
    }
}

#[test]
fn orbit_at_known_time() {
    // timer = 1 at t = 10s
    let (x, y) = orbit_position(orbit_timer(10_000.0), 2);
    assert!((x - 5.0 * 3f64.cos()).abs() < 1e-12);
    assert!((y - 5.0 * 3.2f64.sin()).abs() < 1e-12);
}

#[test]
fn scales_never_change() {
    let mut slot = controller(Viewport::new(800.0, 600.0, 1.0), 4);
    let c = live(&mut slot);
    let before: Vec<f32> = c.objects().iter().map(|o| o.scale()).collect();
    let sched = FakeScheduler::new(Log::default());
    for step in 0..20 {
        c.animate(step as f64 * 16.0, &sched).expect("frame");
    }
    let after: Vec<f32> = c.objects().iter().map(|o| o.scale()).collect();
    assert_eq!(before, after);
    for obj in c.objects() {
        assert_eq!(c.scene().mesh(obj.mesh()).scale, Vec3::splat(obj.scale()));
    }
}

#[test]
fn pointer_offset_from_center() {
    let mut slot = controller(Viewport::new(1000.0, 800.0, 1.0), 5);
    let c = live(&mut slot);
    c.on_pointer_move(700.0, 200.0);
    assert_eq!(c.pointer().x, 2.0);
    assert_eq!(c.pointer().y, -2.0);
}

#[test]
fn camera_eases_toward_pointer() {
    for steps in [1, 10, 100] {
        let mut slot = controller(Viewport::new(1000.0, 800.0, 1.0), 6);
        let c = live(&mut slot);
        // Offset (2.5, 1.5): camera target is (2.5, -1.5).
        c.on_pointer_move(750.0, 550.0);
        let sched = FakeScheduler::new(Log::default());
        for _ in 0..steps {
            c.animate(0.0, &sched).expect("frame");
        }
        let k = 1.0 - (1.0 - CAMERA_EASING).powi(steps);
        let cam = c.camera();
        assert!(close(cam.position.x, 2.5 * k), "x after {steps}: {}", cam.position.x);
        assert!(close(cam.position.y, -1.5 * k), "y after {steps}: {}", cam.position.y);
        assert_eq!(cam.position.z, CAMERA_DISTANCE);
        assert_eq!(cam.target(), Vec3::ZERO);
        assert_eq!(c.renderer().last_camera, Some(cam.position));
    }
}

#[test]
fn resize_updates_aspect_and_buffer() {
    let mut slot = controller(Viewport::new(800.0, 600.0, 2.0), 8);
    let c = live(&mut slot);
    c.on_resize(Viewport::new(1024.0, 512.0, 2.0));
    assert_eq!(c.camera().aspect, 2.0);
    assert_eq!(c.renderer().size(), (1024.0, 512.0));
    assert_eq!(c.renderer().drawing_buffer_size(), (2048, 1024));

    // Pointer offsets use the new center.
    c.on_pointer_move(512.0, 256.0);
    assert_eq!(c.pointer().x, 0.0);
    assert_eq!(c.pointer().y, 0.0);
}

#[test]
fn resize_at_unit_ratio_matches_logical_size() {
    let mut slot = controller(Viewport::new(800.0, 600.0, 1.0), 17);
    let c = live(&mut slot);
    for (w, h) in [(1280.0, 720.0), (333.0, 517.0), (1.0, 1.0)] {
        c.on_resize(Viewport::new(w, h, 1.0));
        assert_eq!(c.camera().aspect, (w / h) as f32);
        assert_eq!(c.renderer().size(), (w, h));
        assert_eq!(c.renderer().drawing_buffer_size(), (w as u32, h as u32));
    }
}

#[test]
fn zero_height_resize_keeps_aspect() {
    let mut slot = controller(Viewport::new(800.0, 400.0, 1.0), 9);
    let c = live(&mut slot);
    c.on_resize(Viewport::new(800.0, 0.0, 1.0));
    assert_eq!(c.camera().aspect, 2.0);
    assert_eq!(c.renderer().size(), (800.0, 0.0));
}

#[test]
fn pixel_ratio_change_rescales_buffer() {
    let mut slot = controller(Viewport::new(640.0, 480.0, 1.0), 10);
    let c = live(&mut slot);
    c.on_pixel_ratio_changed(1.5);
    assert_eq!(c.renderer().drawing_buffer_size(), (960, 720));
}

#[test]
fn each_step_renders_then_schedules_once() {
    let log = Log::default();
    let renderer = FakeRenderer::new(log.clone());
    let mut slot = start(renderer, Viewport::new(800.0, 600.0, 1.0), missing_sky(), 11);
    let c = live(&mut slot);
    let sched = FakeScheduler::new(log.clone());
    for i in 0..3 {
        c.animate(i as f64, &sched).expect("frame");
    }
    assert_eq!(sched.requests.get(), 3);
    assert_eq!(
        *log.borrow(),
        ["render", "schedule", "render", "schedule", "render", "schedule"]
    );
}

#[test]
fn render_failure_stops_scheduling() {
    let log = Log::default();
    let mut renderer = FakeRenderer::new(log.clone());
    renderer.fail = true;
    let mut slot = start(renderer, Viewport::new(800.0, 600.0, 1.0), missing_sky(), 12);
    let c = live(&mut slot);
    let sched = FakeScheduler::new(log.clone());
    assert!(c.animate(0.0, &sched).is_err());
    assert_eq!(sched.requests.get(), 0);
}

#[test]
fn slot_init_schedules_first_frame() {
    let log = Log::default();
    let mut slot = SceneSlot::new();
    let sched = FakeScheduler::new(log.clone());
    let mut rng = StdRng::seed_from_u64(13);
    assert!(!slot.is_initialized());
    slot.init(
        || Ok(FakeRenderer::new(log.clone())),
        Viewport::new(800.0, 600.0, 1.0),
        missing_sky(),
        &mut rng,
        &sched,
    )
    .expect("init");
    assert!(slot.is_initialized());
    assert_eq!(sched.requests.get(), 1);
    // No frame is drawn synchronously during init.
    assert_eq!(slot.get().map(|c| c.renderer().frames), Some(0));
}

#[test]
fn second_init_is_rejected_and_leaves_state_alone() {
    let log = Log::default();
    let mut slot = SceneSlot::new();
    let sched = FakeScheduler::new(log.clone());
    let mut rng = StdRng::seed_from_u64(14);
    let viewport = Viewport::new(800.0, 600.0, 1.0);
    slot.init(|| Ok(FakeRenderer::new(log.clone())), viewport, missing_sky(), &mut rng, &sched)
        .expect("first init");
    let before: Vec<Vec3> = {
        let c = slot.get().expect("controller");
        c.objects().iter().map(|o| c.object_position(o)).collect()
    };

    let acquired = Cell::new(false);
    let err = slot
        .init(
            || {
                acquired.set(true);
                Ok(FakeRenderer::new(log.clone()))
            },
            Viewport::new(320.0, 240.0, 3.0),
            missing_sky(),
            &mut rng,
            &sched,
        )
        .err();
    assert!(matches!(err, Some(SceneError::AlreadyInitialized)));
    assert!(!acquired.get(), "surface must not be acquired again");
    assert_eq!(sched.requests.get(), 1);

    let c = slot.get().expect("controller");
    let after: Vec<Vec3> = c.objects().iter().map(|o| c.object_position(o)).collect();
    assert_eq!(before, after);
    assert_eq!(c.renderer().size(), (800.0, 600.0));
}

#[test]
fn surface_failure_leaves_slot_empty() {
    let mut slot: SceneSlot<FakeRenderer> = SceneSlot::new();
    let sched = FakeScheduler::new(Log::default());
    let mut rng = StdRng::seed_from_u64(15);
    let viewport = Viewport::new(800.0, 600.0, 1.0);
    let err = slot
        .init(|| Err(SurfaceError::NoAdapter), viewport, missing_sky(), &mut rng, &sched)
        .err();
    assert!(matches!(err, Some(SceneError::Surface(SurfaceError::NoAdapter))));
    assert!(!slot.is_initialized());
    assert_eq!(sched.requests.get(), 0);
}

#[test]
fn skybox_faces_load_in_background() {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in SKYBOX_FACES {
        image::RgbImage::from_pixel(8, 8, image::Rgb([40, 90, 160]))
            .save(dir.path().join(name))
            .expect("write face");
    }
    let renderer = FakeRenderer::new(Log::default());
    let mut slot = start(renderer, Viewport::new(800.0, 600.0, 1.0), dir.path(), 16);
    let c = live(&mut slot);
    assert_eq!(c.background().wait(std::time::Duration::from_secs(5)), CubeStatus::Ready);
    let faces = c.background().faces().expect("faces");
    assert_eq!(faces.size, 8);
}
