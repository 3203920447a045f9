use std::sync::atomic::{AtomicU64, Ordering};

use crate::cubemap::CubeTexture;

static NEXT_MATERIAL_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct MaterialId(u64);

/// Metallic-roughness surface lit only by an optional environment cube map.
#[derive(Clone, Debug)]
pub struct StandardMaterial {
    id: MaterialId,
    /// Base color, linear RGB.
    pub color: [f32; 3],
    pub metalness: f32,
    pub roughness: f32,
    pub env_map: Option<CubeTexture>,
}

impl StandardMaterial {
    pub fn new(metalness: f32, roughness: f32) -> Self {
        Self {
            id: MaterialId(NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed)),
            color: [1.0, 1.0, 1.0],
            metalness: metalness.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            env_map: None,
        }
    }

    pub fn with_env_map(mut self, env_map: CubeTexture) -> Self {
        self.env_map = Some(env_map);
        self
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}
