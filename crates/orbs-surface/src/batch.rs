//! Grouping of scene meshes into instanced draws.

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use engine_core::{GeometryId, MaterialId, Scene, SphereGeometry, StandardMaterial};
use engine_shaders::InstanceRaw;

/// One instanced draw: every mesh sharing a geometry and a material.
pub struct DrawBatch {
    pub geometry: Arc<SphereGeometry>,
    pub material: Arc<StandardMaterial>,
    /// Range into the instance buffer built alongside the batches.
    pub instances: Range<u32>,
}

/// Group meshes by (geometry, material) in first-appearance order and build
/// the matching per-instance model matrices.
pub fn build_batches(scene: &Scene) -> (Vec<DrawBatch>, Vec<InstanceRaw>) {
    let mut order: Vec<(GeometryId, MaterialId)> = Vec::new();
    let mut groups: HashMap<(GeometryId, MaterialId), Vec<usize>> = HashMap::new();
    for (i, mesh) in scene.meshes().iter().enumerate() {
        let key = (mesh.geometry.id(), mesh.material.id());
        groups.entry(key).or_insert_with(|| {
            order.push(key);
            Vec::new()
        }).push(i);
    }

    let meshes = scene.meshes();
    let mut batches = Vec::with_capacity(order.len());
    let mut instances = Vec::with_capacity(meshes.len());
    for key in order {
        let members = &groups[&key];
        let start = instances.len() as u32;
        for &i in members {
            instances.push(InstanceRaw { model: meshes[i].model_matrix().to_cols_array_2d() });
        }
        let first = &meshes[members[0]];
        batches.push(DrawBatch {
            geometry: first.geometry.clone(),
            material: first.material.clone(),
            instances: start..instances.len() as u32,
        });
    }
    (batches, instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Mesh;
    use engine_core::glam::Vec3;

    #[test]
    fn shared_geometry_and_material_form_one_batch() {
        let geom = Arc::new(SphereGeometry::new(0.1, 8, 4));
        let mat = Arc::new(StandardMaterial::new(1.0, 0.0));
        let mut scene = Scene::new();
        for i in 0..50 {
            let mut mesh = Mesh::new(geom.clone(), mat.clone());
            mesh.position = Vec3::new(i as f32, 0.0, 0.0);
            scene.add(mesh);
        }

        let (batches, instances) = build_batches(&scene);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].instances, 0..50);
        assert_eq!(instances.len(), 50);
        assert_eq!(instances[7].model[3][0], 7.0);
    }

    #[test]
    fn batches_keep_first_appearance_order() {
        let g = Arc::new(SphereGeometry::new(0.1, 8, 4));
        let m1 = Arc::new(StandardMaterial::new(1.0, 0.0));
        let m2 = Arc::new(StandardMaterial::new(0.0, 1.0));
        let mut scene = Scene::new();
        scene.add(Mesh::new(g.clone(), m2.clone()));
        scene.add(Mesh::new(g.clone(), m1.clone()));
        scene.add(Mesh::new(g.clone(), m2.clone()));

        let (batches, instances) = build_batches(&scene);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].material.id(), m2.id());
        assert_eq!(batches[0].instances, 0..2);
        assert_eq!(batches[1].instances, 2..3);
        assert_eq!(instances.len(), 3);
    }

    #[test]
    fn empty_scene_has_no_batches() {
        let (batches, instances) = build_batches(&Scene::new());
        assert!(batches.is_empty() && instances.is_empty());
    }
}
