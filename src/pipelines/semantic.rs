use crate::data_structures::instance::InstanceRaw;
use crate::data_structures::model::{ModelVertex, Vertex};
use crate::pipelines::{DATA_FORMAT, DEPTH_FORMAT, mk_render_pipeline};

/// Override pass: flat per-instance semantic color, no materials.
pub fn mk_semantic_pipeline(
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Semantic Pipeline Layout"),
        bind_group_layouts: &[Some(camera_layout)],
        immediate_size: 0,
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Semantic Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("semantic_shader.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        DATA_FORMAT,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
