//! engine-core: scene model and wgpu helpers for the skyorbs renderer.
//!
//! Everything except the surface helpers is GPU-agnostic so scene logic can be
//! exercised without a device.

/// Re-export wgpu for downstream crates while avoiding direct dependency leakage.
pub use wgpu;
pub use glam;

mod camera;
mod cubemap;
mod geometry;
mod material;
mod scene;

pub use camera::PerspectiveCamera;
pub use cubemap::{
    CUBE_FACE_COUNT, CubeFaces, CubeMapError, CubeStatus, CubeTexture, CubeTextureId,
    CubeTextureLoader,
};
pub use geometry::{GeometryId, MeshVertex, SphereGeometry};
pub use material::{MaterialId, StandardMaterial};
pub use scene::{Mesh, MeshId, Scene};

/// Host viewport in logical (device-independent) pixels plus the device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self { width, height, pixel_ratio }
    }

    /// Width over height; zero-height viewports report 1.
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }
}

/// Choose an sRGB surface format when available; otherwise, pick the first format.
pub fn choose_srgb_surface_format(
    adapter: &wgpu::Adapter,
    surface: &wgpu::Surface,
) -> wgpu::TextureFormat {
    let caps = surface.get_capabilities(adapter);
    caps.formats
        .iter()
        .copied()
        .find(|f| f.is_srgb())
        .unwrap_or(caps.formats[0])
}

/// Create a surface configuration for the given size, favoring FIFO present mode when present.
pub fn make_surface_config(
    adapter: &wgpu::Adapter,
    surface: &wgpu::Surface,
    width: u32,
    height: u32,
) -> wgpu::SurfaceConfiguration {
    let caps = surface.get_capabilities(adapter);
    let format = choose_srgb_surface_format(adapter, surface);
    let present_mode = caps
        .present_modes
        .iter()
        .copied()
        .find(|m| *m == wgpu::PresentMode::Fifo)
        .unwrap_or(caps.present_modes[0]);
    let alpha_mode = caps
        .alpha_modes
        .iter()
        .copied()
        .find(|m| *m == wgpu::CompositeAlphaMode::Opaque)
        .unwrap_or(caps.alpha_modes[0]);
    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    }
}
