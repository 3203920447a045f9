use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use crate::cubemap::CubeTexture;
use crate::geometry::SphereGeometry;
use crate::material::StandardMaterial;

/// A drawable instance: shared geometry and material plus its own transform.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub geometry: Arc<SphereGeometry>,
    pub material: Arc<StandardMaterial>,
    pub position: Vec3,
    pub scale: Vec3,
}

impl Mesh {
    pub fn new(geometry: Arc<SphereGeometry>, material: Arc<StandardMaterial>) -> Self {
        Self { geometry, material, position: Vec3::ZERO, scale: Vec3::ONE }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, Quat::IDENTITY, self.position)
    }
}

/// Index of a mesh inside its [`Scene`]. Meshes are never removed, so ids stay valid.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct MeshId(usize);

impl MeshId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Flat scene graph: a background plus meshes in insertion order.
#[derive(Debug, Default)]
pub struct Scene {
    pub background: Option<CubeTexture>,
    /// World origin of the scene; cameras aim here.
    pub position: Vec3,
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn mesh(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.0]
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> &mut Mesh {
        &mut self.meshes[id.0]
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
