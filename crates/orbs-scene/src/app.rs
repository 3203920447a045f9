use std::path::PathBuf;

use anyhow::Result;
use orbs_surface::{RenderSurface, sanitize_pixel_ratio};
use orbs_window::{EventHandler, WindowCtx};

use crate::controller::{SceneSlot, wall_clock_ms};

/// Window event handler driving the one scene controller.
pub struct SceneApp {
    slot: SceneSlot<RenderSurface>,
    sky_dir: PathBuf,
}

impl SceneApp {
    pub fn new(sky_dir: impl Into<PathBuf>) -> Self {
        Self { slot: SceneSlot::new(), sky_dir: sky_dir.into() }
    }
}

impl EventHandler for SceneApp {
    fn init(&mut self, ctx: &mut WindowCtx) -> Result<()> {
        let mut viewport = ctx.viewport();
        viewport.pixel_ratio = sanitize_pixel_ratio(viewport.pixel_ratio);
        let window = ctx.window();
        let size = ctx.physical_size();
        let mut rng = rand::thread_rng();
        self.slot.init(
            || RenderSurface::new(window, (size.width, size.height)),
            viewport,
            &self.sky_dir,
            &mut rng,
            &*ctx,
        )?;
        Ok(())
    }

    fn on_resize(&mut self, _ctx: &mut WindowCtx, viewport: engine_core::Viewport) -> Result<()> {
        if let Some(controller) = self.slot.get_mut() {
            controller.on_resize(viewport);
        }
        Ok(())
    }

    fn on_mouse_move(&mut self, _ctx: &mut WindowCtx, pos: [f64; 2]) -> Result<()> {
        if let Some(controller) = self.slot.get_mut() {
            controller.on_pointer_move(pos[0], pos[1]);
        }
        Ok(())
    }

    fn on_scale_factor_changed(&mut self, _ctx: &mut WindowCtx, scale_factor: f64) -> Result<()> {
        if let Some(controller) = self.slot.get_mut() {
            controller.on_pixel_ratio_changed(sanitize_pixel_ratio(scale_factor));
        }
        Ok(())
    }

    fn on_redraw(&mut self, ctx: &mut WindowCtx) -> Result<()> {
        if let Some(controller) = self.slot.get_mut() {
            controller.animate(wall_clock_ms(), &*ctx)?;
        }
        Ok(())
    }
}
