//! Per-instance transformation data for GPU rendering.
//!
//! Each placed mesh carries one instance record: its decomposed world
//! transform plus the semantic color used by the semantic-mask pass. The raw
//! form is packed into a GPU vertex buffer with instance step mode.

use cgmath::One;

use crate::data_structures::model;
use crate::math::Decomposed;

/// Position, rotation (as quaternion) and per-axis scale of one placed mesh.
#[derive(Clone, Debug)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Identity transformation (no move, rotate, or scale). Room and Ground
    /// geometry is placed with this since it is pre-baked in world space.
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self, semantic: [f32; 4]) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            semantic,
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Decomposed> for Instance {
    fn from(d: Decomposed) -> Self {
        Instance {
            position: d.translation,
            rotation: d.rotation,
            scale: d.scale,
        }
    }
}

/// Encode an instance ordinal into the low 24 bits of an RGB color, one
/// channel per byte. The semantic pass writes this color flat per surface.
pub fn semantic_color(id: u32) -> [f32; 4] {
    [
        (id & 0xff) as f32 / 255.0,
        ((id >> 8) & 0xff) as f32 / 255.0,
        ((id >> 16) & 0xff) as f32 / 255.0,
        1.0,
    ]
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    semantic: [f32; 4],
}

/**
 * As we store instance data directly in GPU memory we need to tell what the
 * bytes refer to.
 *
 * Stride layout here: world matrix as four 4d vectors, then the semantic color.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // The shader only advances to the next record when it starts
            // processing a new instance.
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // A mat4 takes up 4 vertex slots as it is technically 4 vec4s.
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Vector3};

    #[test]
    fn decomposed_transform_round_trips_through_instance() {
        let d = Decomposed {
            translation: Vector3::new(4.5, 0.0, -2.25),
            rotation: cgmath::Quaternion::one(),
            scale: Vector3::new(2.0, 1.0, 0.5),
        };
        let instance = Instance::from(d);
        let m = instance.to_matrix();
        // Fourth column carries the translation.
        assert!((Vector3::new(m.w.x, m.w.y, m.w.z) - d.translation).magnitude() < 1e-6);
        // Basis column norms carry the scale.
        assert!((Vector3::new(m.x.x, m.x.y, m.x.z).magnitude() - 2.0).abs() < 1e-6);
        assert!((Vector3::new(m.z.x, m.z.y, m.z.z).magnitude() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn semantic_colors_encode_the_ordinal_per_channel() {
        assert_eq!(semantic_color(0), [0.0, 0.0, 0.0, 1.0]);
        let c = semantic_color(0x0201ff);
        assert!((c[0] - 1.0).abs() < 1e-6);
        assert!((c[1] - 1.0 / 255.0).abs() < 1e-6);
        assert!((c[2] - 2.0 / 255.0).abs() < 1e-6);
        assert_eq!(c[3], 1.0);
    }

    #[test]
    fn semantic_colors_are_unique_per_instance() {
        let a = semantic_color(1);
        let b = semantic_color(2);
        assert_ne!(a, b);
    }
}
