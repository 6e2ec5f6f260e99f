//! Material layout, diffuse color parsing, and texture file loading.

use std::path::Path;

use crate::data_structures::texture::Texture;
use crate::house::MaterialSpec;

/// Opaque white, the fallback whenever a diffuse spec is absent or fails to
/// parse.
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Bind group layout for surface materials: diffuse texture, sampler, and
/// the diffuse color uniform.
pub fn material_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
        label: Some("Material bind_group_layout"),
    })
}

/// Parse an HTML-style hex color: `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(raw: &str) -> Option<[f32; 4]> {
    let hex = raw.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let wide = |s: &str| u8::from_str_radix(s, 16).ok();
    let narrow = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v * 17);
    let channels = match hex.len() {
        3 => [
            narrow(&hex[0..1])?,
            narrow(&hex[1..2])?,
            narrow(&hex[2..3])?,
            255,
        ],
        6 => [
            wide(&hex[0..2])?,
            wide(&hex[2..4])?,
            wide(&hex[4..6])?,
            255,
        ],
        8 => [
            wide(&hex[0..2])?,
            wide(&hex[2..4])?,
            wide(&hex[4..6])?,
            wide(&hex[6..8])?,
        ],
        _ => return None,
    };
    Some([
        channels[0] as f32 / 255.0,
        channels[1] as f32 / 255.0,
        channels[2] as f32 / 255.0,
        channels[3] as f32 / 255.0,
    ])
}

/// Diffuse color of a node material spec, defaulting to opaque white when the
/// spec is absent or its hex string does not parse.
pub fn diffuse_color(spec: Option<&MaterialSpec>) -> [f32; 4] {
    spec.and_then(|m| m.diffuse.as_deref())
        .and_then(parse_hex_color)
        .unwrap_or(WHITE)
}

/// Load and decode a texture file into a mip-mapped GPU texture.
pub fn load_texture_file(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    path: &Path,
) -> anyhow::Result<Texture> {
    let data = std::fs::read(path)?;
    let img = image::load_from_memory(&data)?;
    Texture::from_image_mipmapped(device, queue, &img, Some(&path.display().to_string()))
}
