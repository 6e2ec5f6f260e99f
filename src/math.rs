//! Explicit transform matrix decomposition.
//!
//! Node transforms arrive as 16 floats in column-major 4x4 form and must be
//! split into translation, rotation and scale before they can drive an
//! instance. The corpus encodes shear-free but anisotropic scale, so scale is
//! always the Euclidean norm of each basis column, never assumed to be 1, and
//! rotation is built from the matrix's forward and up basis columns rather
//! than a generic matrix-to-quaternion formula.

use cgmath::{InnerSpace, Matrix3, One, Quaternion, Vector3, Vector4};

const EPSILON: f32 = 1e-6;

/// Translation/rotation/scale split of an object-to-world matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposed {
    pub translation: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Decomposed {
    fn default() -> Self {
        Self {
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Build the rotation whose local +z axis is `forward` and whose local +y
/// axis approximates `up`. Degenerate inputs (zero-length forward, forward
/// collinear with up) fall back to the identity rotation.
pub fn look_rotation(forward: Vector3<f32>, up: Vector3<f32>) -> Quaternion<f32> {
    if forward.magnitude2() < EPSILON {
        return Quaternion::one();
    }
    let f = forward.normalize();
    let right = up.cross(f);
    if right.magnitude2() < EPSILON {
        return Quaternion::one();
    }
    let r = right.normalize();
    let u = f.cross(r);
    Quaternion::from(Matrix3::from_cols(r, u, f))
}

/// Decompose a column-major object-to-world matrix (`matrix[col * 4 + row]`).
///
/// Translation comes from the fourth column, rotation from the normalized
/// forward (column 2) and up (column 1) basis columns, and per-axis scale
/// from the magnitude of each full basis column.
pub fn decompose(matrix: &[f32; 16]) -> Decomposed {
    let translation = Vector3::new(matrix[12], matrix[13], matrix[14]);
    let up = Vector3::new(matrix[4], matrix[5], matrix[6]);
    let forward = Vector3::new(matrix[8], matrix[9], matrix[10]);
    let rotation = look_rotation(forward, up);
    let scale = Vector3::new(
        Vector4::new(matrix[0], matrix[1], matrix[2], matrix[3]).magnitude(),
        Vector4::new(matrix[4], matrix[5], matrix[6], matrix[7]).magnitude(),
        Vector4::new(matrix[8], matrix[9], matrix[10], matrix[11]).magnitude(),
    );
    Decomposed {
        translation,
        rotation,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Matrix4, Point3, Rotation3, Transform};

    fn to_column_major(matrix: Matrix4<f32>) -> [f32; 16] {
        let cols: [[f32; 4]; 4] = matrix.into();
        let mut flat = [0.0; 16];
        for (c, col) in cols.iter().enumerate() {
            for (r, v) in col.iter().enumerate() {
                flat[c * 4 + r] = *v;
            }
        }
        flat
    }

    fn compose(d: &Decomposed) -> Matrix4<f32> {
        Matrix4::from_translation(d.translation)
            * Matrix4::from(d.rotation)
            * Matrix4::from_nonuniform_scale(d.scale.x, d.scale.y, d.scale.z)
    }

    fn assert_close(a: Vector3<f32>, b: Vector3<f32>, tolerance: f32) {
        assert!(
            (a - b).magnitude() < tolerance,
            "expected {:?} close to {:?}",
            a,
            b
        );
    }

    #[test]
    fn identity_decomposes_to_identity() {
        let mut matrix = [0.0; 16];
        matrix[0] = 1.0;
        matrix[5] = 1.0;
        matrix[10] = 1.0;
        matrix[15] = 1.0;
        let d = decompose(&matrix);
        assert_close(d.translation, Vector3::new(0.0, 0.0, 0.0), 1e-6);
        assert_close(d.scale, Vector3::new(1.0, 1.0, 1.0), 1e-6);
        assert_eq!(d.rotation, Quaternion::one());
    }

    #[test]
    fn translation_comes_from_fourth_column() {
        let matrix = to_column_major(Matrix4::from_translation(Vector3::new(4.5, 0.0, -2.25)));
        let d = decompose(&matrix);
        assert_close(d.translation, Vector3::new(4.5, 0.0, -2.25), 1e-6);
    }

    #[test]
    fn anisotropic_scale_is_column_norms() {
        let matrix = to_column_major(Matrix4::from_nonuniform_scale(2.0, 0.5, 3.0));
        let d = decompose(&matrix);
        assert_close(d.scale, Vector3::new(2.0, 0.5, 3.0), 1e-5);
    }

    #[test]
    fn look_rotation_maps_local_z_to_forward() {
        let forward = Vector3::new(1.0, 0.0, 1.0);
        let q = look_rotation(forward, Vector3::unit_y());
        let rotated = q * Vector3::unit_z();
        assert_close(rotated, forward.normalize(), 1e-5);
    }

    #[test]
    fn look_rotation_degenerate_inputs_fall_back_to_identity() {
        assert_eq!(
            look_rotation(Vector3::new(0.0, 0.0, 0.0), Vector3::unit_y()),
            Quaternion::one()
        );
        assert_eq!(
            look_rotation(Vector3::unit_y(), Vector3::unit_y()),
            Quaternion::one()
        );
    }

    #[test]
    fn reapplying_decomposition_reproduces_unit_cube_corners() {
        let rotation = Quaternion::from_axis_angle(Vector3::unit_y(), Deg(40.0));
        let original = Matrix4::from_translation(Vector3::new(1.5, -0.25, 3.0))
            * Matrix4::from(rotation)
            * Matrix4::from_nonuniform_scale(2.0, 1.0, 0.5);

        let d = decompose(&to_column_major(original));
        let recomposed = compose(&d);

        for &x in &[0.0, 1.0] {
            for &y in &[0.0, 1.0] {
                for &z in &[0.0, 1.0] {
                    let corner = Point3::new(x, y, z);
                    let expected = original.transform_point(corner);
                    let actual = recomposed.transform_point(corner);
                    assert_close(
                        Vector3::new(actual.x, actual.y, actual.z),
                        Vector3::new(expected.x, expected.y, expected.z),
                        1e-4,
                    );
                }
            }
        }
    }
}
