//! GPU-side caches for scene resources, keyed by their CPU identities.

use std::collections::HashMap;

use engine_core::wgpu::util::DeviceExt;
use engine_core::{
    CUBE_FACE_COUNT, CubeFaces, CubeTexture, CubeTextureId, GeometryId, MaterialId, SphereGeometry,
    StandardMaterial, wgpu,
};
use engine_shaders::MaterialUniform;

use crate::pipeline::ScenePipelines;

pub(crate) struct GpuGeometry {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub index_count: u32,
}

pub(crate) struct GpuCube {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

pub(crate) struct GpuMaterial {
    uniform: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    env_loaded: bool,
}

pub(crate) struct GpuResources {
    geometries: HashMap<GeometryId, GpuGeometry>,
    cubes: HashMap<CubeTextureId, GpuCube>,
    materials: HashMap<MaterialId, GpuMaterial>,
    /// Black 1x1 cube bound while an env map is still loading or failed.
    placeholder: GpuCube,
    sky_bind_group: Option<(CubeTextureId, wgpu::BindGroup)>,
}

fn upload_cube(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    faces: &CubeFaces,
) -> GpuCube {
    let size = faces.size.max(1);
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: CUBE_FACE_COUNT as u32,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    for (layer, data) in faces.faces.iter().enumerate() {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: 0, y: 0, z: layer as u32 },
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(size * 4),
                rows_per_image: Some(size),
            },
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
        );
    }
    let view = texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some(label),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    });
    GpuCube { _texture: texture, view }
}

impl GpuResources {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let black = CubeFaces {
            size: 1,
            faces: std::array::from_fn(|_| vec![0, 0, 0, 255]),
        };
        Self {
            geometries: HashMap::new(),
            cubes: HashMap::new(),
            materials: HashMap::new(),
            placeholder: upload_cube(device, queue, "cube:placeholder", &black),
            sky_bind_group: None,
        }
    }

    /// Upload a cube map the first time it is seen ready. Returns whether it is resident.
    pub fn sync_cube(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        tex: &CubeTexture,
    ) -> bool {
        if self.cubes.contains_key(&tex.id()) {
            return true;
        }
        match tex.faces() {
            Some(faces) => {
                log::info!("uploading cube texture {:?} ({}px)", tex.id(), faces.size);
                let gpu = upload_cube(device, queue, "cube:env", &faces);
                self.cubes.insert(tex.id(), gpu);
                true
            }
            None => false,
        }
    }

    pub fn sync_geometry(&mut self, device: &wgpu::Device, geometry: &SphereGeometry) {
        self.geometries.entry(geometry.id()).or_insert_with(|| GpuGeometry {
            vertex: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sphere-vb"),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            index: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sphere-ib"),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: geometry.indices.len() as u32,
        });
    }

    /// Create or refresh the material bind group; rebuilt when its env map becomes resident.
    pub fn sync_material(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipelines: &ScenePipelines,
        material: &StandardMaterial,
    ) {
        let env = material.env_map.as_ref().and_then(|t| self.cubes.get(&t.id()));
        let env_loaded = env.is_some();
        if self.materials.get(&material.id()).is_some_and(|m| m.env_loaded == env_loaded) {
            return;
        }

        let uniform_data = MaterialUniform {
            color: [material.color[0], material.color[1], material.color[2], 1.0],
            params: [
                material.metalness,
                material.roughness,
                if env_loaded { 1.0 } else { 0.0 },
                0.0,
            ],
        };
        let view = &env.unwrap_or(&self.placeholder).view;

        let uniform = match self.materials.remove(&material.id()) {
            Some(existing) => {
                queue.write_buffer(&existing.uniform, 0, bytemuck::bytes_of(&uniform_data));
                existing.uniform
            }
            None => device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("material-ub"),
                contents: bytemuck::bytes_of(&uniform_data),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            }),
        };
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material-bg"),
            layout: &pipelines.material_bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: uniform.as_entire_binding() },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&pipelines.sampler),
                },
            ],
        });
        self.materials.insert(material.id(), GpuMaterial { uniform, bind_group, env_loaded });
    }

    /// Bind group for the sky-box pass, once the background is resident.
    pub fn sync_sky(
        &mut self,
        device: &wgpu::Device,
        pipelines: &ScenePipelines,
        background: &CubeTexture,
    ) {
        if self.sky_bind_group.as_ref().is_some_and(|(id, _)| *id == background.id()) {
            return;
        }
        let Some(cube) = self.cubes.get(&background.id()) else {
            return;
        };
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky-bg"),
            layout: &pipelines.sky_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&cube.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&pipelines.sampler),
                },
            ],
        });
        self.sky_bind_group = Some((background.id(), bind_group));
    }

    pub fn sky_bind_group(&self, background: &CubeTexture) -> Option<&wgpu::BindGroup> {
        self.sky_bind_group
            .as_ref()
            .filter(|(id, _)| *id == background.id())
            .map(|(_, bg)| bg)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&GpuGeometry> {
        self.geometries.get(&id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&GpuMaterial> {
        self.materials.get(&id)
    }
}
