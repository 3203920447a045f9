//! orbs-window: minimal winit host for the skyorbs scene.
//!
//! Responsibilities:
//! - Create the event loop and the window that serves as the drawable target.
//! - Dispatch resize, pointer-move, scale-factor and frame events to an [`EventHandler`].
//! - Provide the per-refresh frame callback through [`FrameScheduler`].
//!
//! Frames are drawn only when requested. A handler that wants continuous
//! animation requests its next frame from inside `on_redraw`.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use engine_core::Viewport;
use winit::dpi::{LogicalPosition, PhysicalPosition, PhysicalSize};
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

pub use winit;

/// Host primitive that runs a callback on the next display refresh.
pub trait FrameScheduler {
    fn request_frame(&self);
}

pub struct HostWindow {
    event_loop: EventLoop<()>,
    // Leaked so wgpu surfaces can borrow it for 'static.
    window: &'static Window,
}

pub struct WindowCtx {
    window: &'static Window,
    size: PhysicalSize<u32>,
    scale_factor: f64,
}

impl WindowCtx {
    pub fn window(&self) -> &'static Window { self.window }
    pub fn physical_size(&self) -> PhysicalSize<u32> { self.size }
    pub fn scale_factor(&self) -> f64 { self.scale_factor }
    /// Logical viewport plus device pixel ratio.
    pub fn viewport(&self) -> Viewport { logical_viewport(self.size, self.scale_factor) }
}

impl FrameScheduler for WindowCtx {
    fn request_frame(&self) {
        self.window.request_redraw();
    }
}

/// Convert a physical window size into a logical viewport.
pub fn logical_viewport(size: PhysicalSize<u32>, scale_factor: f64) -> Viewport {
    let logical = size.to_logical::<f64>(scale_factor);
    Viewport::new(logical.width, logical.height, scale_factor)
}

/// Convert a physical cursor position into logical pixels.
pub fn logical_cursor(position: [f64; 2], scale_factor: f64) -> [f64; 2] {
    let p: LogicalPosition<f64> =
        PhysicalPosition::new(position[0], position[1]).to_logical(scale_factor);
    [p.x, p.y]
}

pub trait EventHandler {
    fn init(&mut self, _ctx: &mut WindowCtx) -> Result<()> { Ok(()) }
    fn on_resize(&mut self, _ctx: &mut WindowCtx, _viewport: Viewport) -> Result<()> { Ok(()) }
    /// `pos` is in logical pixels.
    fn on_mouse_move(&mut self, _ctx: &mut WindowCtx, _pos: [f64; 2]) -> Result<()> { Ok(()) }
    fn on_scale_factor_changed(&mut self, _ctx: &mut WindowCtx, _scale_factor: f64) -> Result<()> {
        Ok(())
    }
    fn on_redraw(&mut self, _ctx: &mut WindowCtx) -> Result<()> { Ok(()) }
}

impl HostWindow {
    pub fn new(title: &str) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new().with_title(title).build(&event_loop)?;
        let window: &'static Window = Box::leak(Box::new(window));
        Ok(Self { event_loop, window })
    }

    /// Run until the window closes. An error from `init` stops the loop and is returned.
    pub fn run(self, mut handler: impl EventHandler + 'static) -> Result<()> {
        let window = self.window;
        let mut size = window.inner_size();
        let mut scale_factor = window.scale_factor();
        let mut needs_init = true;
        let fatal: Rc<RefCell<Option<anyhow::Error>>> = Rc::new(RefCell::new(None));
        let fatal_in_loop = fatal.clone();

        self.event_loop.run(move |event, elwt| {
            macro_rules! ctx {
                () => {
                    WindowCtx { window, size, scale_factor }
                };
            }
            // Handler errors after init are per-event: log and keep running.
            let report = |what: &str, res: Result<()>| {
                if let Err(e) = res {
                    log::error!("{} handler failed: {:#}", what, e);
                }
            };

            match event {
                Event::Resumed => {
                    if needs_init {
                        needs_init = false;
                        if let Err(e) = handler.init(&mut ctx!()) {
                            log::error!("initialization failed: {:#}", e);
                            *fatal_in_loop.borrow_mut() = Some(e);
                            elwt.exit();
                        }
                    }
                }
                Event::WindowEvent { window_id, event } if window_id == window.id() => {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(new_size) => {
                            size = new_size;
                            let viewport = logical_viewport(size, scale_factor);
                            report("resize", handler.on_resize(&mut ctx!(), viewport));
                        }
                        WindowEvent::ScaleFactorChanged { scale_factor: sf, .. } => {
                            scale_factor = sf;
                            let res = handler.on_scale_factor_changed(&mut ctx!(), sf);
                            report("scale-factor", res);
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            let pos = logical_cursor([position.x, position.y], scale_factor);
                            report("pointer-move", handler.on_mouse_move(&mut ctx!(), pos));
                        }
                        WindowEvent::RedrawRequested if !needs_init => {
                            report("redraw", handler.on_redraw(&mut ctx!()));
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        })?;

        match fatal.borrow_mut().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
