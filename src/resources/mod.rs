use std::path::Path;

use crate::config::ExportConfig;
use crate::data_structures::{model, texture::Texture};
use crate::house::MaterialSpec;
use crate::resources::texture::{diffuse_color, load_texture_file, WHITE};

/**
 * This module contains all logic for loading mesh/textures/etc. from external files.
 */
pub mod mesh;
pub mod texture;

/// Resolve one mesh file into a renderable model.
///
/// Returns `Ok(None)` when the file is absent — the caller decides whether a
/// missing variant is legitimate (Room wall/floor/ceiling) or a corpus
/// data-quality issue worth logging (Object/Ground).
///
/// Materials come from the OBJ's MTL set when it has one; meshes without any
/// MTL material are colored by the node's material spec, including its
/// optional dataset texture reference.
pub fn load_model_obj(
    path: &Path,
    node_material: Option<&MaterialSpec>,
    config: &ExportConfig,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> anyhow::Result<Option<model::Model>> {
    if !path.exists() {
        return Ok(None);
    }

    let (models, obj_materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )?;

    let label = path.display().to_string();
    let mut meshes = mesh::load_meshes(&models, &label, device);

    let fallback_color = diffuse_color(node_material);
    let mut materials = Vec::new();
    match obj_materials {
        Ok(mats) => {
            let obj_dir = path.parent().unwrap_or_else(|| Path::new("."));
            for m in &mats {
                materials.push(build_mtl_material(
                    m,
                    obj_dir,
                    fallback_color,
                    device,
                    queue,
                    layout,
                ));
            }
        }
        Err(e) => {
            log::warn!("no loadable MTL materials for {label}: {e}");
        }
    }
    if materials.is_empty() {
        materials.push(build_node_material(
            node_material,
            config,
            &label,
            device,
            queue,
            layout,
        ));
    }

    // MTL parse failures can leave material ids pointing past the fallback.
    for mesh in &mut meshes {
        if mesh.material >= materials.len() {
            mesh.material = 0;
        }
    }

    Ok(Some(model::Model { meshes, materials }))
}

fn build_mtl_material(
    m: &tobj::Material,
    obj_dir: &Path,
    fallback_color: [f32; 4],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> model::Material {
    let color = m
        .diffuse
        .map(|d| [d[0], d[1], d[2], 1.0])
        .unwrap_or(fallback_color);
    let diffuse_texture = match &m.diffuse_texture {
        Some(texture_name) => {
            let texture_path = obj_dir.join(texture_name);
            match load_texture_file(device, queue, &texture_path) {
                Ok(texture) => Some(texture),
                Err(e) => {
                    log::warn!("failed to load texture {}: {e}", texture_path.display());
                    None
                }
            }
        }
        None => None,
    };
    let texture = diffuse_texture
        .unwrap_or_else(|| Texture::from_color(device, queue, [255, 255, 255, 255], &m.name));
    model::Material::new(device, &m.name, color, &texture, layout)
}

fn build_node_material(
    node_material: Option<&MaterialSpec>,
    config: &ExportConfig,
    label: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
) -> model::Material {
    let color = diffuse_color(node_material);
    let referenced_texture = node_material.and_then(|spec| spec.texture.as_deref());
    let texture = match referenced_texture {
        Some(texture_name) => {
            let texture_path = config.texture_path(texture_name);
            match load_texture_file(device, queue, &texture_path) {
                Ok(texture) => Some(texture),
                Err(e) => {
                    log::warn!("failed to load texture {}: {e}", texture_path.display());
                    None
                }
            }
        }
        None => None,
    };
    // A textured material keeps white as its base so the texture is not
    // tinted twice; untextured surfaces carry the spec's diffuse color.
    let (color, texture) = match texture {
        Some(texture) => (WHITE, texture),
        None => (
            color,
            Texture::from_color(device, queue, [255, 255, 255, 255], label),
        ),
    };
    let name = node_material.map_or(label, |spec| spec.name.as_str());
    model::Material::new(device, name, color, &texture, layout)
}
