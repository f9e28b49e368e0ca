//! Offscreen scene rendering with wgpu

use crate::{shaders, GpuContext};
use bytemuck::{Pod, Zeroable};
use nalgebra::{Matrix4, Vector3};
use std::collections::HashMap;
use std::sync::Arc;
use ultrav_core::{
    Background, Camera, Color, Error, FrameSnapshot, Light, Material, Renderer, Result, Scene,
    TriangleMesh,
};

const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertex data for mesh rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Vertex buffer layout descriptor
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// Interleave a mesh's positions and normals
    pub fn from_mesh(mesh: &TriangleMesh) -> Vec<MeshVertex> {
        let computed;
        let normals = match &mesh.normals {
            Some(n) => n,
            None => {
                computed = mesh.compute_vertex_normals();
                &computed
            }
        };
        mesh.vertices
            .iter()
            .zip(normals.iter())
            .map(|(p, n)| MeshVertex {
                position: [p.x, p.y, p.z],
                normal: [n.x, n.y, n.z],
            })
            .collect()
    }
}

/// Per-frame uniform data
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FrameUniform {
    view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    environment: [f32; 4],
}

/// Per-draw uniform data
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ObjectUniform {
    model: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    color: [f32; 4],
    params: [f32; 4],
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// 4x multisampling
    pub antialias: bool,
    /// Physical pixels per logical pixel of the surface
    pub pixel_ratio: f32,
    /// Used when the scene has no background
    pub clear_color: Color,
    /// Scale applied to the environment's average radiance
    pub environment_intensity: f32,
    pub exposure: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            antialias: true,
            pixel_ratio: 1.0,
            clear_color: [0.0, 0.0, 0.0],
            environment_intensity: 0.5,
            exposure: 1.0,
        }
    }
}

impl FrameUniform {
    fn new(scene: &Scene, camera: &Camera, settings: &RenderSettings) -> Self {
        let mut ambient = [0.0f32; 3];
        let mut light_dir = [0.0, -1.0, 0.0];
        let mut light_color = [0.0f32; 3];
        let mut have_directional = false;

        for light in &scene.lights {
            match *light {
                Light::Ambient { color, intensity } => {
                    for c in 0..3 {
                        ambient[c] += color[c] * intensity;
                    }
                }
                // Only the first directional light is shaded
                Light::Directional { color, intensity, position, .. } if !have_directional => {
                    let dir = -position.coords;
                    let dir = dir.try_normalize(f32::EPSILON).unwrap_or_else(|| -Vector3::y());
                    light_dir = [dir.x, dir.y, dir.z];
                    light_color = color.map(|c| c * intensity);
                    have_directional = true;
                }
                Light::Directional { .. } => {}
            }
        }

        let environment = scene
            .environment
            .as_ref()
            .map(|env| env.average_radiance().map(|c| c * settings.environment_intensity))
            .unwrap_or([0.0; 3]);

        let p = camera.position;
        Self {
            view_proj: camera.view_projection().into(),
            camera_pos: [p.x, p.y, p.z, 1.0],
            ambient: [ambient[0], ambient[1], ambient[2], 0.0],
            light_dir: [light_dir[0], light_dir[1], light_dir[2], 0.0],
            light_color: [light_color[0], light_color[1], light_color[2], 0.0],
            environment: [environment[0], environment[1], environment[2], 0.0],
        }
    }
}

impl ObjectUniform {
    fn new(world: &Matrix4<f32>, material: &Material, exposure: f32) -> Self {
        let normal_matrix = world
            .try_inverse()
            .unwrap_or_else(Matrix4::identity)
            .transpose();
        let (color, params) = match material {
            Material::Basic { color } => (*color, [1.0, 0.0, 1.0, exposure]),
            Material::Standard(m) => (m.color, [m.roughness, m.metalness, 0.0, exposure]),
        };
        Self {
            model: (*world).into(),
            normal_matrix: normal_matrix.into(),
            color: [color[0], color[1], color[2], 1.0],
            params,
        }
    }
}

/// Clear color for the frame, tone mapped when it comes from an HDR environment
fn clear_color(scene: &Scene, settings: &RenderSettings) -> wgpu::Color {
    let c = match &scene.background {
        Some(Background::Color(c)) => *c,
        Some(Background::Environment(env)) => {
            env.average_radiance().map(|v| v * settings.exposure / (1.0 + v * settings.exposure))
        }
        None => settings.clear_color,
    };
    wgpu::Color {
        r: c[0] as f64,
        g: c[1] as f64,
        b: c[2] as f64,
        a: 1.0,
    }
}

struct GpuGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    // Holding the mesh keeps the cache key's address from being reused
    _owner: Arc<TriangleMesh>,
}

struct GpuState {
    gpu: GpuContext,
    pipeline: wgpu::RenderPipeline,
    object_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    color_texture: wgpu::Texture,
    color_view: wgpu::TextureView,
    msaa_texture: Option<wgpu::Texture>,
    msaa_view: Option<wgpu::TextureView>,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    geometry: HashMap<usize, GpuGeometry>,
}

/// wgpu renderer drawing into an offscreen target the size of the surface
pub struct SceneRenderer {
    settings: RenderSettings,
    width: u32,
    height: u32,
    state: Option<GpuState>,
}

impl SceneRenderer {
    /// Create a renderer for a surface of `width` x `height` logical pixels.
    ///
    /// Blocks while the adapter and device are acquired.
    pub fn new(width: u32, height: u32, settings: RenderSettings) -> Result<Self> {
        let ratio = settings.pixel_ratio.max(0.1);
        let width = ((width as f32 * ratio).round() as u32).max(1);
        let height = ((height as f32 * ratio).round() as u32).max(1);

        let gpu = pollster::block_on(GpuContext::new())?;
        let sample_count = if settings.antialias { 4 } else { 1 };

        let frame_layout = gpu.create_uniform_layout(
            "frame_bind_group_layout",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );
        let object_layout = gpu.create_uniform_layout(
            "object_bind_group_layout",
            wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        );

        let frame_buffer = gpu.create_buffer(
            "Frame Uniform Buffer",
            std::mem::size_of::<FrameUniform>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let frame_bind_group = gpu.create_uniform_bind_group("frame_bind_group", &frame_layout, &frame_buffer);

        let shader = gpu.create_shader_module("Mesh Shader", shaders::MESH_SHADER);
        let pipeline = Self::create_render_pipeline(&gpu.device, &[&frame_layout, &object_layout], &shader, sample_count);

        let (color_texture, color_view) = Self::create_target(&gpu.device, width, height, 1, COLOR_FORMAT, "Color Target");
        let (msaa_texture, msaa_view) = if sample_count > 1 {
            let (texture, view) = Self::create_target(&gpu.device, width, height, sample_count, COLOR_FORMAT, "MSAA Target");
            (Some(texture), Some(view))
        } else {
            (None, None)
        };
        let (depth_texture, depth_view) = Self::create_target(&gpu.device, width, height, sample_count, DEPTH_FORMAT, "Depth Target");

        tracing::debug!("Created {}x{} scene renderer (msaa x{})", width, height, sample_count);

        Ok(Self {
            settings,
            width,
            height,
            state: Some(GpuState {
                gpu,
                pipeline,
                object_layout,
                frame_buffer,
                frame_bind_group,
                color_texture,
                color_view,
                msaa_texture,
                msaa_view,
                depth_texture,
                depth_view,
                geometry: HashMap::new(),
            }),
        })
    }

    fn create_target(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        sample_count: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        if sample_count == 1 && format == COLOR_FORMAT {
            usage |= wgpu::TextureUsages::COPY_SRC;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Create the render pipeline for lit meshes
    fn create_render_pipeline(
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        shader: &wgpu::ShaderModule,
        sample_count: u32,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Render Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Render Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[MeshVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // glTF models are frequently double sided
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        })
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    fn state(&self) -> Result<&GpuState> {
        self.state
            .as_ref()
            .ok_or_else(|| Error::Visualization("renderer has been disposed".to_string()))
    }
}

impl GpuState {
    /// Upload geometry not seen before and drop geometry no longer in the scene
    fn sync_geometry(&mut self, scene: &Scene) {
        let mut live = Vec::new();
        for (_, mesh) in scene.world_meshes() {
            let key = Arc::as_ptr(&mesh.geometry) as usize;
            live.push(key);
            if self.geometry.contains_key(&key) {
                continue;
            }
            let vertices = MeshVertex::from_mesh(&mesh.geometry);
            let indices = mesh.geometry.indices();
            let vertex_buffer = self.gpu.create_buffer_init("Mesh Vertex Buffer", &vertices, wgpu::BufferUsages::VERTEX);
            let index_buffer = self.gpu.create_buffer_init("Mesh Index Buffer", &indices, wgpu::BufferUsages::INDEX);
            self.geometry.insert(
                key,
                GpuGeometry {
                    vertex_buffer,
                    index_buffer,
                    index_count: indices.len() as u32,
                    _owner: mesh.geometry.clone(),
                },
            );
        }
        self.geometry.retain(|key, _| live.contains(key));
    }
}

impl Renderer for SceneRenderer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) -> Result<()> {
        let settings = self.settings.clone();
        let state = self
            .state
            .as_mut()
            .ok_or_else(|| Error::Visualization("renderer has been disposed".to_string()))?;

        state.sync_geometry(scene);

        let frame = FrameUniform::new(scene, camera, &settings);
        state.gpu.queue.write_buffer(&state.frame_buffer, 0, bytemuck::bytes_of(&frame));

        let draws: Vec<(wgpu::BindGroup, usize)> = scene
            .world_meshes()
            .into_iter()
            .map(|(world, mesh)| {
                let uniform = ObjectUniform::new(&world, &mesh.material, settings.exposure);
                let buffer = state.gpu.create_buffer_init("Object Uniform Buffer", &[uniform], wgpu::BufferUsages::UNIFORM);
                let bind_group = state.gpu.create_uniform_bind_group("object_bind_group", &state.object_layout, &buffer);
                (bind_group, Arc::as_ptr(&mesh.geometry) as usize)
            })
            .collect();

        let mut encoder = state.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Scene Render Encoder"),
        });

        let (color_attachment, resolve_target) = match state.msaa_view.as_ref() {
            Some(msaa_view) => (msaa_view, Some(&state.color_view)),
            None => (&state.color_view, None),
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_attachment,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(scene, &settings)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &state.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&state.pipeline);
            render_pass.set_bind_group(0, &state.frame_bind_group, &[]);
            for (bind_group, key) in &draws {
                let Some(geometry) = state.geometry.get(key) else {
                    continue;
                };
                render_pass.set_bind_group(1, bind_group, &[]);
                render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                render_pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..geometry.index_count, 0, 0..1);
            }
        }

        state.gpu.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn dispose(&mut self) {
        if let Some(state) = self.state.take() {
            for geometry in state.geometry.values() {
                geometry.vertex_buffer.destroy();
                geometry.index_buffer.destroy();
            }
            state.frame_buffer.destroy();
            state.color_texture.destroy();
            if let Some(texture) = &state.msaa_texture {
                texture.destroy();
            }
            state.depth_texture.destroy();
            tracing::debug!("Disposed scene renderer");
        }
    }

    fn is_disposed(&self) -> bool {
        self.state.is_none()
    }

    fn snapshot(&mut self) -> Result<Option<FrameSnapshot>> {
        let state = self.state()?;
        let (width, height) = (self.width, self.height);

        let unpadded = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let buffer = state.gpu.create_buffer(
            "Snapshot Buffer",
            padded as u64 * height as u64,
            wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        );

        let mut encoder = state.gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Snapshot Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &state.color_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        state.gpu.queue.submit(std::iter::once(encoder.finish()));

        let slice = buffer.slice(..);
        let (sender, receiver) = flume::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        state.gpu.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|_| Error::Gpu("Failed to receive mapping result".into()))?
            .map_err(|e| Error::Gpu(format!("Buffer mapping failed: {:?}", e)))?;

        let mut rgba = Vec::with_capacity((unpadded * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(padded as usize) {
                rgba.extend_from_slice(&row[..unpadded as usize]);
            }
        }
        buffer.unmap();

        Ok(Some(FrameSnapshot { width, height, rgba }))
    }
}

impl Drop for SceneRenderer {
    fn drop(&mut self) {
        self.dispose();
    }
}
