//! Buffer-type catalog, offscreen render targets and the multi-pass loop.
//!
//! For every camera (in loaded order) and every configured buffer spec (in
//! catalog order), the renderer acquires a square multisampled color+depth
//! target, clears it with the spec's background color, draws the whole scene
//! through either each surface's own material or the spec's override shader,
//! reads the resolved raster back as 8-bit RGB and writes a PNG named
//! `<houseId>_<cameraIndex>_<bufferId>.png`. Targets are released on every
//! exit path so thousands of renders per house cannot leak GPU memory.

use std::iter;

use crate::{
    camera::CameraPose,
    config::{ConfigError, ExportConfig},
    context::Context,
    data_structures::{model::DrawModel, texture::Texture},
    pipelines::{Pipelines, SAMPLE_COUNT},
    scene::Scene,
};

/// One render-buffer configuration: identifier, background clear color, and
/// an optional shader override (`None` means default per-material shading).
#[derive(Debug, Clone, PartialEq)]
pub struct BufferSpec {
    pub id: String,
    pub background: wgpu::Color,
    pub shader_override: Option<String>,
}

impl BufferSpec {
    /// Look up a catalog entry by its identifier.
    pub fn with_id(id: &str) -> Option<Self> {
        match id {
            "albedo" => Some(Self {
                id: id.to_string(),
                background: wgpu::Color::BLACK,
                shader_override: None,
            }),
            // Far plane clears to white so empty pixels read as "infinitely
            // far" rather than touching the camera.
            "depth" => Some(Self {
                id: id.to_string(),
                background: wgpu::Color::WHITE,
                shader_override: Some("depth".to_string()),
            }),
            // Black background encodes the reserved semantic id 0.
            "semantic" => Some(Self {
                id: id.to_string(),
                background: wgpu::Color::BLACK,
                shader_override: Some("semantic".to_string()),
            }),
            _ => None,
        }
    }
}

/// Resolve the configured buffer ids against the catalog. Unknown ids or an
/// unknown default shader are configuration errors, fatal at startup.
pub fn resolve_buffer_specs(config: &ExportConfig) -> Result<Vec<BufferSpec>, ConfigError> {
    if !Pipelines::is_known_shader(&config.default_shader) {
        return Err(ConfigError::UnknownShader(config.default_shader.clone()));
    }
    config
        .buffer_ids
        .iter()
        .map(|id| BufferSpec::with_id(id).ok_or_else(|| ConfigError::UnknownBufferId(id.clone())))
        .collect()
}

/// Texture-to-buffer copies require row alignment; the readback buffer pads
/// each row of RGBA pixels up to the next alignment boundary.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = 4 * width;
    unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT) * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT
}

/// Drop the row padding and the alpha channel from mapped readback data.
pub fn strip_padded_rgba(data: &[u8], dim: u32, padded_bytes_per_row: u32) -> Vec<u8> {
    let dim = dim as usize;
    let stride = padded_bytes_per_row as usize;
    let mut rgb = Vec::with_capacity(dim * dim * 3);
    for row in 0..dim {
        let start = row * stride;
        for pixel in 0..dim {
            let p = start + pixel * 4;
            rgb.extend_from_slice(&data[p..p + 3]);
        }
    }
    rgb
}

/// A scoped offscreen target: multisampled color and depth attachments, the
/// single-sample resolve texture, and the CPU readback buffer.
///
/// Acquired before a render pass and destroyed when dropped, which covers
/// every exit path including readback failures.
pub struct OffscreenTarget {
    dim: u32,
    padded_bytes_per_row: u32,
    color: wgpu::Texture,
    resolve: wgpu::Texture,
    depth: Texture,
    readback: wgpu::Buffer,
    color_view: wgpu::TextureView,
    resolve_view: wgpu::TextureView,
}

impl OffscreenTarget {
    pub fn acquire(device: &wgpu::Device, dim: u32, format: wgpu::TextureFormat) -> Self {
        let extent = wgpu::Extent3d {
            width: dim,
            height: dim,
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen color"),
            size: extent,
            mip_level_count: 1,
            sample_count: SAMPLE_COUNT,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let resolve = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen resolve"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = Texture::create_depth_texture(
            device,
            [dim, dim],
            SAMPLE_COUNT,
            "Offscreen depth",
        );

        let padded = padded_bytes_per_row(dim);
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Offscreen readback"),
            size: (padded * dim) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let resolve_view = resolve.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            dim,
            padded_bytes_per_row: padded,
            color,
            resolve,
            depth,
            readback,
            color_view,
            resolve_view,
        }
    }

    pub fn color_attachment(&self, clear: wgpu::Color) -> wgpu::RenderPassColorAttachment<'_> {
        wgpu::RenderPassColorAttachment {
            view: &self.color_view,
            resolve_target: Some(&self.resolve_view),
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        }
    }

    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth.view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }

    /// Queue the resolved raster into the readback buffer.
    pub fn copy_to_readback(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.resolve,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_bytes_per_row),
                    rows_per_image: Some(self.dim),
                },
            },
            wgpu::Extent3d {
                width: self.dim,
                height: self.dim,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Map the readback buffer and return the raster as tightly packed 8-bit
    /// RGB rows. Must be called after the copy was submitted.
    pub fn read_rgb(&self, device: &wgpu::Device) -> anyhow::Result<Vec<u8>> {
        let buffer_slice = self.readback.slice(..);
        // NOTE: We have to create the mapping THEN device.poll() before
        // awaiting the receiver, otherwise the map callback never runs.
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })?;
        pollster::block_on(rx.receive())
            .ok_or_else(|| anyhow::anyhow!("readback channel closed before mapping finished"))??;

        let data = buffer_slice.get_mapped_range();
        let rgb = strip_padded_rgba(&data, self.dim, self.padded_bytes_per_row);
        drop(data);
        self.readback.unmap();
        Ok(rgb)
    }
}

impl Drop for OffscreenTarget {
    fn drop(&mut self) {
        self.color.destroy();
        self.resolve.destroy();
        self.depth.texture.destroy();
        self.readback.destroy();
    }
}

/// Render every camera through every buffer spec and export the PNGs.
pub fn render_house(
    ctx: &mut Context,
    config: &ExportConfig,
    scene: &Scene,
    cameras: &[CameraPose],
    specs: &[BufferSpec],
) -> anyhow::Result<()> {
    std::fs::create_dir_all(config.output_dir())?;

    for pose in cameras {
        // The camera projection is pass-invariant: written once per camera,
        // only clear color and shading differ between buffer specs.
        ctx.update_camera(pose);

        for spec in specs {
            let shader = spec
                .shader_override
                .as_deref()
                .unwrap_or(&config.default_shader);
            let pass = ctx
                .pipelines
                .by_name(shader)
                .ok_or_else(|| anyhow::anyhow!("unknown shader `{shader}`"))?;

            let target = OffscreenTarget::acquire(&ctx.device, config.export_dim, pass.format);
            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Export Encoder"),
                });
            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Export Pass"),
                    color_attachments: &[Some(target.color_attachment(spec.background))],
                    depth_stencil_attachment: Some(target.depth_attachment()),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });

                render_pass.set_pipeline(pass.pipeline);
                for instance in &scene.instances {
                    render_pass.set_vertex_buffer(1, instance.instance_buffer.slice(..));
                    if pass.uses_materials {
                        render_pass.draw_model_instanced(
                            &instance.model,
                            0..1,
                            &ctx.camera.bind_group,
                        );
                    } else {
                        render_pass.draw_model_flat(&instance.model, 0..1, &ctx.camera.bind_group);
                    }
                }
            }
            target.copy_to_readback(&mut encoder);
            ctx.queue.submit(iter::once(encoder.finish()));

            let rgb = target.read_rgb(&ctx.device)?;
            let image = image::RgbImage::from_raw(config.export_dim, config.export_dim, rgb)
                .ok_or_else(|| anyhow::anyhow!("readback raster has unexpected size"))?;
            let out_path = config.output_path(&scene.house_id, pose.index, &spec.id);
            image.save(&out_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(buffer_ids: &[&str], default_shader: &str) -> ExportConfig {
        ExportConfig {
            data_root: "/data/".to_string(),
            export_dim: 256,
            buffer_ids: buffer_ids.iter().map(|s| s.to_string()).collect(),
            houses: vec![],
            default_shader: default_shader.to_string(),
        }
    }

    #[test]
    fn catalog_resolves_known_buffer_ids() {
        let albedo = BufferSpec::with_id("albedo").unwrap();
        assert_eq!(albedo.shader_override, None);
        assert_eq!(albedo.background, wgpu::Color::BLACK);

        let depth = BufferSpec::with_id("depth").unwrap();
        assert_eq!(depth.shader_override.as_deref(), Some("depth"));
        assert_eq!(depth.background, wgpu::Color::WHITE);

        assert!(BufferSpec::with_id("normals").is_none());
    }

    #[test]
    fn specs_resolve_in_configured_order() {
        let cfg = config(&["semantic", "albedo", "depth"], "albedo");
        let specs = resolve_buffer_specs(&cfg).unwrap();
        let ids: Vec<_> = specs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["semantic", "albedo", "depth"]);
    }

    #[test]
    fn unknown_buffer_id_is_a_config_error() {
        let cfg = config(&["albedo", "motion"], "albedo");
        let err = resolve_buffer_specs(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBufferId(id) if id == "motion"));
    }

    #[test]
    fn unknown_default_shader_is_a_config_error() {
        let cfg = config(&["albedo"], "Standard");
        let err = resolve_buffer_specs(&cfg).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownShader(name) if name == "Standard"));
    }

    #[test]
    fn rows_are_padded_to_the_copy_alignment() {
        assert_eq!(padded_bytes_per_row(256), 1024);
        assert_eq!(padded_bytes_per_row(100), 512);
        assert_eq!(padded_bytes_per_row(1), 256);
    }

    #[test]
    fn strip_drops_row_padding_and_alpha() {
        // 2x2 raster padded to 16 bytes per row.
        let mut data = vec![0u8; 32];
        for (i, px) in [(0usize, 10u8), (4, 20), (16, 30), (20, 40)] {
            data[i] = px;
            data[i + 1] = px + 1;
            data[i + 2] = px + 2;
            data[i + 3] = 255;
        }
        let rgb = strip_padded_rgba(&data, 2, 16);
        assert_eq!(
            rgb,
            vec![10, 11, 12, 20, 21, 22, 30, 31, 32, 40, 41, 42]
        );
    }
}
