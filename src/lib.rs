//! suncg-export
//!
//! A headless batch renderer for SUNCG-style indoor scene datasets. Each house
//! description is assembled into a mesh/material scene, a batch of pre-computed
//! camera poses is placed, and every camera is rendered through a catalog of
//! shading passes (color, depth, semantic) into square offscreen targets that
//! are exported as PNG files. The crate exposes a small surface for driving the
//! export loop house-by-house with explicit GPU resource teardown in between.
//!
//! High-level modules
//! - `batch`: the per-tick orchestrator state machine over the house corpus
//! - `camera`: camera pose loading and view/projection uniforms
//! - `config`: export configuration and dataset path templates
//! - `context`: headless GPU context that owns device/queue/pipelines
//! - `data_structures`: engine data models (meshes, instances, textures)
//! - `house`: the house/level/node description model
//! - `math`: explicit transform matrix decomposition
//! - `pipelines`: definitions for the render-buffer shading pipelines
//! - `render`: buffer-type catalog, offscreen targets and the multi-pass loop
//! - `resources`: helpers to load meshes/textures and create GPU resources
//! - `scene`: scene assembly and the per-house instance arena
//!

pub mod batch;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod house;
pub mod math;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use wgpu::*;
