//! CPU-side mesh geometry.

use std::f32::consts::PI;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Interleaved vertex: position + normal.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub pos: [f32; 3],
    pub nrm: [f32; 3],
}

/// Identity used by renderers to cache uploaded buffers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct GeometryId(u64);

/// UV sphere centered at the origin.
///
/// Rings run from the +Y pole (`iy == 0`) to the -Y pole; the first and last
/// rings emit a single triangle per segment so the poles carry no degenerate
/// triangles. Front faces wind counter-clockwise.
#[derive(Clone, Debug)]
pub struct SphereGeometry {
    id: GeometryId,
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl SphereGeometry {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((ws + 1) * (hs + 1)) as usize);
        let mut grid: Vec<Vec<u16>> = Vec::with_capacity((hs + 1) as usize);

        for iy in 0..=hs {
            let v = iy as f32 / hs as f32;
            let theta = v * PI;
            let mut row = Vec::with_capacity((ws + 1) as usize);
            for ix in 0..=ws {
                let u = ix as f32 / ws as f32;
                let phi = u * PI * 2.0;
                let nrm = [-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin()];
                row.push(vertices.len() as u16);
                vertices.push(MeshVertex {
                    pos: [nrm[0] * radius, nrm[1] * radius, nrm[2] * radius],
                    nrm,
                });
            }
            grid.push(row);
        }

        let mut indices = Vec::new();
        for iy in 0..hs as usize {
            for ix in 0..ws as usize {
                let a = grid[iy][ix + 1];
                let b = grid[iy][ix];
                let c = grid[iy + 1][ix];
                let d = grid[iy + 1][ix + 1];
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != hs as usize - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self {
            id: GeometryId(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed)),
            radius,
            width_segments: ws,
            height_segments: hs,
            vertices,
            indices,
        }
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }
}
