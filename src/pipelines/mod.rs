//! Render-buffer shading pipelines.
//!
//! One pipeline per catalog shader: `albedo` renders every surface with its
//! own bound material, while `depth` and `semantic` are override shaders that
//! draw the entire visible scene through a single non-photoreal pass. All
//! pipelines render into multisampled offscreen targets.

pub mod albedo;
pub mod depth;
pub mod semantic;

use crate::data_structures::texture::Texture;

/// Multisample count for every offscreen target. wgpu only guarantees 4x
/// across backends.
pub const SAMPLE_COUNT: u32 = 4;

/// The default pass renders into an sRGB target.
pub const ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Override passes encode data values; a linear target keeps them
/// untransformed on readback.
pub const DATA_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// A resolved shading pass: the pipeline, the target format it renders into,
/// and whether per-surface materials are bound.
pub struct PassPipeline<'a> {
    pub pipeline: &'a wgpu::RenderPipeline,
    pub format: wgpu::TextureFormat,
    pub uses_materials: bool,
}

#[derive(Debug)]
pub struct Pipelines {
    pub albedo: wgpu::RenderPipeline,
    pub depth: wgpu::RenderPipeline,
    pub semantic: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        material_layout: &wgpu::BindGroupLayout,
        camera_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            albedo: albedo::mk_albedo_pipeline(device, material_layout, camera_layout),
            depth: depth::mk_depth_pipeline(device, camera_layout),
            semantic: semantic::mk_semantic_pipeline(device, camera_layout),
        }
    }

    /// Resolve a shader name from a buffer spec or the configured default.
    pub fn by_name(&self, name: &str) -> Option<PassPipeline<'_>> {
        match name {
            "albedo" => Some(PassPipeline {
                pipeline: &self.albedo,
                format: ALBEDO_FORMAT,
                uses_materials: true,
            }),
            "depth" => Some(PassPipeline {
                pipeline: &self.depth,
                format: DATA_FORMAT,
                uses_materials: false,
            }),
            "semantic" => Some(PassPipeline {
                pipeline: &self.semantic,
                format: DATA_FORMAT,
                uses_materials: false,
            }),
            _ => None,
        }
    }

    /// Shader-name validation without a device, for startup checks.
    pub fn is_known_shader(name: &str) -> bool {
        matches!(name, "albedo" | "depth" | "semantic")
    }
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Dataset room shells are modeled single-sided facing inward;
            // culling either face drops visible walls.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: SAMPLE_COUNT,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}

/// Depth-buffer format shared by every pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = Texture::DEPTH_FORMAT;
