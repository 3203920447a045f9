use engine_core::glam::Mat4;
use engine_core::{PerspectiveCamera, Scene, make_surface_config, wgpu};
use engine_shaders::{GlobalsUniform, InstanceRaw};

use crate::batch::build_batches;
use crate::pipeline::{DEPTH_FORMAT, ScenePipelines};
use crate::resources::GpuResources;
use crate::{RenderError, Renderer, SurfaceError, drawing_buffer_size, sanitize_pixel_ratio};

/// MSAA sample count; the surface is always antialiased.
pub const SAMPLE_COUNT: u32 = 4;

struct FrameTargets {
    msaa: wgpu::TextureView,
    depth: wgpu::TextureView,
}

/// wgpu-backed renderer bound to a window surface.
pub struct RenderSurface {
    surface: wgpu::Surface<'static>,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    /// Logical size last passed to `set_size`.
    size: (f64, f64),
    pixel_ratio: f64,
    pipelines: ScenePipelines,
    resources: GpuResources,
    targets: Option<FrameTargets>,
    globals: wgpu::Buffer,
    globals_bg: wgpu::BindGroup,
    instances: Option<(wgpu::Buffer, usize)>,
}

impl RenderSurface {
    /// Acquire a surface for `target` (usually a window) and open a device on
    /// a compatible adapter. `physical_size` seeds the swapchain until the
    /// first `set_size`.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        physical_size: (u32, u32),
    ) -> Result<Self, SurfaceError> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(target)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or(SurfaceError::NoAdapter)?;
        log::info!("Using adapter: {:?}", adapter.get_info());

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("skyorbs-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
            },
            None,
        ))?;

        let config = make_surface_config(&adapter, &surface, physical_size.0, physical_size.1);
        surface.configure(&device, &config);

        let pipelines = ScenePipelines::new(&device, config.format, SAMPLE_COUNT);
        let resources = GpuResources::new(&device, &queue);

        let globals = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals-ub"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals-bg"),
            layout: &pipelines.globals_bgl,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: globals.as_entire_binding() }],
        });

        let mut this = Self {
            surface,
            adapter,
            device,
            queue,
            config,
            size: (physical_size.0 as f64, physical_size.1 as f64),
            pixel_ratio: 1.0,
            pipelines,
            resources,
            targets: None,
            globals,
            globals_bg,
            instances: None,
        };
        this.rebuild_targets();
        Ok(this)
    }

    fn reconfigure(&mut self) {
        let (w, h) = drawing_buffer_size(self.size, self.pixel_ratio);
        if w == 0 || h == 0 {
            // Minimized; keep the previous configuration until we get a real size.
            self.targets = None;
            return;
        }
        self.config = make_surface_config(&self.adapter, &self.surface, w, h);
        self.surface.configure(&self.device, &self.config);
        self.rebuild_targets();
        log::debug!("surface configured {}x{} (ratio {})", w, h, self.pixel_ratio);
    }

    fn rebuild_targets(&mut self) {
        let size = wgpu::Extent3d {
            width: self.config.width,
            height: self.config.height,
            depth_or_array_layers: 1,
        };
        let make = |label: &str, format: wgpu::TextureFormat| {
            self.device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size,
                    mip_level_count: 1,
                    sample_count: SAMPLE_COUNT,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };
        self.targets = Some(FrameTargets {
            msaa: make("msaa-color", self.config.format),
            depth: make("depth", DEPTH_FORMAT),
        });
    }

    fn write_instances(&mut self, data: &[InstanceRaw]) {
        if data.is_empty() {
            return;
        }
        let needed = data.len();
        let fits = self.instances.as_ref().is_some_and(|(_, cap)| *cap >= needed);
        if !fits {
            let capacity = needed.next_power_of_two();
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("instance-vb"),
                size: (capacity * std::mem::size_of::<InstanceRaw>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.instances = Some((buffer, capacity));
        }
        if let Some((buffer, _)) = &self.instances {
            self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(data));
        }
    }
}

fn globals_for(camera: &PerspectiveCamera) -> GlobalsUniform {
    let view = camera.view_matrix();
    let mut sky_view = view;
    sky_view.w_axis = engine_core::glam::Vec4::W;
    let inv_sky = (camera.projection_matrix() * sky_view).inverse();
    let inv_sky = if inv_sky.is_finite() { inv_sky } else { Mat4::IDENTITY };
    GlobalsUniform {
        view_proj: (camera.projection_matrix() * view).to_cols_array_2d(),
        inv_sky_view_proj: inv_sky.to_cols_array_2d(),
        camera_pos: camera.position.extend(1.0).to_array(),
    }
}

impl Renderer for RenderSurface {
    fn set_size(&mut self, width: f64, height: f64) {
        self.size = (width.max(0.0), height.max(0.0));
        self.reconfigure();
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = sanitize_pixel_ratio(ratio);
        self.reconfigure();
    }

    fn size(&self) -> (f64, f64) {
        self.size
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<(), RenderError> {
        if self.targets.is_none() {
            return Ok(());
        }

        // Bring GPU copies up to date before recording.
        let (batches, instance_data) = build_batches(scene);
        if let Some(bg) = &scene.background {
            if self.resources.sync_cube(&self.device, &self.queue, bg) {
                self.resources.sync_sky(&self.device, &self.pipelines, bg);
            }
        }
        for batch in &batches {
            if let Some(env) = &batch.material.env_map {
                self.resources.sync_cube(&self.device, &self.queue, env);
            }
            self.resources.sync_geometry(&self.device, &batch.geometry);
            self.resources.sync_material(
                &self.device,
                &self.queue,
                &self.pipelines,
                &batch.material,
            );
        }
        self.write_instances(&instance_data);
        self.queue.write_buffer(&self.globals, 0, bytemuck::bytes_of(&globals_for(camera)));

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated; reconfiguring and skipping frame");
                self.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out acquiring surface frame; skipping");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene-encoder"),
        });
        {
            let Some(targets) = &self.targets else {
                return Ok(());
            };
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &targets.msaa,
                    resolve_target: Some(&view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Discard,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &targets.depth,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let sky_bg = scene
                .background
                .as_ref()
                .and_then(|bg| self.resources.sky_bind_group(bg));
            if let Some(sky_bg) = sky_bg {
                pass.set_pipeline(&self.pipelines.sky);
                pass.set_bind_group(0, &self.globals_bg, &[]);
                pass.set_bind_group(1, sky_bg, &[]);
                pass.draw(0..3, 0..1);
            }

            if let Some((instance_buf, _)) = &self.instances {
                pass.set_pipeline(&self.pipelines.standard);
                pass.set_bind_group(0, &self.globals_bg, &[]);
                pass.set_vertex_buffer(1, instance_buf.slice(..));
                for batch in &batches {
                    let (Some(geom), Some(mat)) = (
                        self.resources.geometry(batch.geometry.id()),
                        self.resources.material(batch.material.id()),
                    ) else {
                        continue;
                    };
                    pass.set_bind_group(1, &mat.bind_group, &[]);
                    pass.set_vertex_buffer(0, geom.vertex.slice(..));
                    pass.set_index_buffer(geom.index.slice(..), wgpu::IndexFormat::Uint16);
                    pass.draw_indexed(0..geom.index_count, 0, batch.instances.clone());
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
