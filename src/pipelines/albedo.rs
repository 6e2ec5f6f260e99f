use crate::data_structures::instance::InstanceRaw;
use crate::data_structures::model::{ModelVertex, Vertex};
use crate::pipelines::{ALBEDO_FORMAT, DEPTH_FORMAT, mk_render_pipeline};

/// Default shading: every surface samples its own bound material.
pub fn mk_albedo_pipeline(
    device: &wgpu::Device,
    material_layout: &wgpu::BindGroupLayout,
    camera_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Albedo Pipeline Layout"),
        bind_group_layouts: &[Some(material_layout), Some(camera_layout)],
        immediate_size: 0,
    });

    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Albedo Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("albedo_shader.wgsl").into()),
    };

    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        ALBEDO_FORMAT,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(DEPTH_FORMAT),
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
