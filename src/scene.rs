//! Scene assembly and the per-house instance arena.
//!
//! Assembly runs in two stages. `assemble` resolves a house description into
//! CPU placement records — per-type mesh path resolution, transform
//! decomposition and the missing-file policy — without touching the GPU.
//! `upload` turns placements into GPU-backed scene instances stamped with the
//! batch generation, so clearing a house is dropping/resetting the arena
//! rather than searching the scene for tagged objects.

use wgpu::util::DeviceExt;

use std::path::PathBuf;

use crate::{
    config::ExportConfig,
    context::Context,
    data_structures::{
        instance::{Instance, semantic_color},
        model::Model,
    },
    house::{House, MaterialSpec, Node, NodeType},
    math,
    resources::load_model_obj,
};

/// Suffixes of the up-to-three meshes a room addresses: wall, floor, ceiling.
const ROOM_SUFFIXES: [&str; 3] = ["w", "f", "c"];

/// One resolved mesh placement: which file to load, where to put it, how to
/// color it, and the id the semantic pass encodes for it.
#[derive(Debug, Clone)]
pub struct Placement {
    pub obj_path: PathBuf,
    pub transform: Instance,
    pub material: Option<MaterialSpec>,
    pub semantic_id: u32,
    pub label: String,
}

/// Resolve every valid node of a house into placements.
///
/// Missing Room variants are skipped without error (rooms do not always have
/// all three meshes); missing Object/Ground meshes and unrecognized node
/// types are reported but never abort the house.
pub fn assemble(house: &House, config: &ExportConfig) -> Vec<Placement> {
    let mut placements: Vec<Placement> = Vec::new();
    // Semantic id 0 is reserved for the background clear color.
    let push = |placements: &mut Vec<Placement>,
                    obj_path: PathBuf,
                    transform: Instance,
                    node: &Node,
                    label: String| {
        let semantic_id = placements.len() as u32 + 1;
        placements.push(Placement {
            obj_path,
            transform,
            material: node.material().cloned(),
            semantic_id,
            label,
        });
    };

    for level in &house.levels {
        for node in &level.nodes {
            if !node.is_valid() {
                continue;
            }
            match &node.node_type {
                NodeType::Object => {
                    let Some(transform) = object_transform(node) else {
                        continue;
                    };
                    let path = config.object_obj_path(&node.model_id);
                    if path.exists() {
                        let label = format!("Node_{}", node.model_id);
                        push(&mut placements, path, transform, node, label);
                    } else {
                        log::error!(
                            "missing object mesh {} for node {}",
                            path.display(),
                            node.model_id
                        );
                    }
                }
                NodeType::Room => {
                    // Room meshes are pre-baked in world space: identity
                    // transform, and not all three variants exist.
                    for suffix in ROOM_SUFFIXES {
                        let path = config.room_obj_path(&house.id, &node.model_id, suffix);
                        if path.exists() {
                            let label = format!("Node_{}{}", node.model_id, suffix);
                            push(&mut placements, path, Instance::new(), node, label);
                        }
                    }
                }
                NodeType::Ground => {
                    let path = config.room_obj_path(&house.id, &node.model_id, "f");
                    if path.exists() {
                        let label = format!("Node_{}f", node.model_id);
                        push(&mut placements, path, Instance::new(), node, label);
                    } else {
                        log::error!(
                            "missing ground mesh {} for node {}",
                            path.display(),
                            node.model_id
                        );
                    }
                }
                // Boxes carry no renderable mesh; a known gap, not an error.
                NodeType::Box => {}
                NodeType::Unknown(raw) => {
                    log::error!("unhandled node type: {raw}");
                }
            }
        }
    }
    placements
}

fn object_transform(node: &Node) -> Option<Instance> {
    match &node.transform {
        None => Some(Instance::new()),
        Some(values) => match <&[f32; 16]>::try_from(values.as_slice()) {
            Ok(matrix) => Some(math::decompose(matrix).into()),
            Err(_) => {
                log::error!(
                    "node {} transform has {} values, expected 16",
                    node.model_id,
                    values.len()
                );
                None
            }
        },
    }
}

/// One placed mesh with its GPU resources, stamped with the house-iteration
/// generation it belongs to.
#[derive(Debug)]
pub struct SceneInstance {
    pub label: String,
    pub generation: u64,
    pub model: Model,
    pub instance_buffer: wgpu::Buffer,
}

/// The per-house instance arena.
#[derive(Debug)]
pub struct Scene {
    pub house_id: String,
    generation: u64,
    pub instances: Vec<SceneInstance>,
}

impl Scene {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Drop every runtime instance of this house iteration. GPU buffers are
    /// released with the records.
    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

/// Load placement geometry and build the GPU-side scene.
pub fn upload(
    ctx: &Context,
    config: &ExportConfig,
    house_id: &str,
    placements: Vec<Placement>,
    generation: u64,
) -> anyhow::Result<Scene> {
    let mut instances = Vec::new();
    for placement in placements {
        let model = load_model_obj(
            &placement.obj_path,
            placement.material.as_ref(),
            config,
            &ctx.device,
            &ctx.queue,
            &ctx.material_layout,
        )?;
        let Some(model) = model else {
            // Assembly saw the file; it disappeared before upload.
            log::error!("mesh {} not found during upload", placement.obj_path.display());
            continue;
        };

        let raw = placement
            .transform
            .to_raw(semantic_color(placement.semantic_id));
        let instance_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&placement.label),
            contents: bytemuck::cast_slice(&[raw]),
            usage: wgpu::BufferUsages::VERTEX,
        });

        instances.push(SceneInstance {
            label: placement.label,
            generation,
            model,
            instance_buffer,
        });
    }
    log::debug!("house {house_id}: {} scene instances", instances.len());
    Ok(Scene {
        house_id: house_id.to_string(),
        generation,
        instances,
    })
}
