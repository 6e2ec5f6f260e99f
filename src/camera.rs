//! Camera pose loading and view/projection uniforms.
//!
//! Pose files carry one camera per non-empty line: twelve whitespace-separated
//! floats in fixed column order — position (3), look direction (3), up vector
//! (3), half-horizontal field of view in radians, a secondary FOV value that
//! is discarded for positional compatibility, and a view-quality score. Output
//! order matches input line order exactly since output filenames encode the
//! camera index.

use std::path::{Path, PathBuf};

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3, perspective};
use thiserror::Error;

/// Fields per pose line: 3 position, 3 look, 3 up, 2 FOV, 1 quality.
pub const POSE_FIELDS: usize = 12;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Remaps the OpenGL clip-space depth range [-1, 1] produced by cgmath to
/// wgpu's [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Error)]
pub enum PoseError {
    #[error("failed to read camera pose file {path}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("camera pose line {line}: expected {POSE_FIELDS} fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("camera pose line {line}: invalid float `{value}`")]
    InvalidFloat { line: usize, value: String },
    #[error("camera pose line {line}: zero-length direction vector")]
    DegenerateDirection { line: usize },
}

/// One pre-computed camera placement. The view-quality score is informational
/// only and never consulted by rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraPose {
    pub index: usize,
    pub position: Vector3<f32>,
    pub towards: Vector3<f32>,
    pub up: Vector3<f32>,
    pub fov_deg: f32,
    pub quality: f32,
}

impl CameraPose {
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(Point3::from_vec(self.position), self.towards, self.up)
    }

    /// Square-aspect perspective projection. The FOV is fixed at load time
    /// and does not change per render pass.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(Deg(self.fov_deg), 1.0, NEAR_PLANE, FAR_PLANE)
    }
}

/// Parse pose records from file contents. Any malformed line is fatal for the
/// whole file; the batch orchestrator decides what a per-house failure means.
pub fn parse_camera_poses(contents: &str) -> Result<Vec<CameraPose>, PoseError> {
    let mut poses = Vec::new();
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_no + 1;

        let mut fields = [0.0f32; POSE_FIELDS];
        let mut found = 0;
        for raw in line.split_whitespace() {
            if found < POSE_FIELDS {
                fields[found] = raw.parse().map_err(|_| PoseError::InvalidFloat {
                    line: line_no,
                    value: raw.to_string(),
                })?;
            }
            found += 1;
        }
        if found != POSE_FIELDS {
            return Err(PoseError::FieldCount {
                line: line_no,
                found,
            });
        }

        let towards = Vector3::new(fields[3], fields[4], fields[5]);
        let up = Vector3::new(fields[6], fields[7], fields[8]);
        if towards.magnitude2() == 0.0 || up.magnitude2() == 0.0 {
            return Err(PoseError::DegenerateDirection { line: line_no });
        }

        // fields[10] is the secondary FOV value, read and discarded.
        poses.push(CameraPose {
            index: poses.len(),
            position: Vector3::new(fields[0], fields[1], fields[2]),
            towards: towards.normalize(),
            up: up.normalize(),
            fov_deg: 2.0 * fields[9].to_degrees(),
            quality: fields[11],
        });
    }
    Ok(poses)
}

/// Load the pose batch for one house.
pub fn load_camera_poses(path: &Path) -> Result<Vec<CameraPose>, PoseError> {
    let contents = std::fs::read_to_string(path).map_err(|source| PoseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_camera_poses(&contents)
}

/// Camera data as laid out in the shader uniform.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    /// x = near plane, y = far plane.
    planes: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
            view: Matrix4::identity().into(),
            planes: [NEAR_PLANE, FAR_PLANE, 0.0, 0.0],
        }
    }

    pub fn update(&mut self, pose: &CameraPose) {
        let view = pose.view_matrix();
        self.view_proj = (pose.projection_matrix() * view).into();
        self.view = view.into();
        self.planes = [NEAR_PLANE, FAR_PLANE, 0.0, 0.0];
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_documented_example_line() {
        let poses = parse_camera_poses("0 0 5  0 0 -1  0 1 0  0.6981 0.6981 0.9").unwrap();
        assert_eq!(poses.len(), 1);
        let pose = &poses[0];
        assert_eq!(pose.index, 0);
        assert_eq!(pose.position, Vector3::new(0.0, 0.0, 5.0));
        assert_eq!(pose.towards, Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(pose.up, Vector3::new(0.0, 1.0, 0.0));
        assert!((pose.fov_deg - 80.0).abs() < 0.01);
        assert!((pose.quality - 0.9).abs() < 1e-6);
    }

    #[test]
    fn preserves_input_order_and_skips_blank_lines() {
        let contents = "\
1 0 0  0 0 1  0 1 0  0.5 0.5 0.1

2 0 0  0 0 1  0 1 0  0.5 0.5 0.2
3 0 0  0 0 1  0 1 0  0.5 0.5 0.3
";
        let poses = parse_camera_poses(contents).unwrap();
        assert_eq!(poses.len(), 3);
        for (i, pose) in poses.iter().enumerate() {
            assert_eq!(pose.index, i);
            assert_eq!(pose.position.x, (i + 1) as f32);
        }
    }

    #[test]
    fn normalizes_look_and_up_vectors() {
        let poses = parse_camera_poses("0 0 0  0 0 -2  0 3 0  0.5 0.5 0.0").unwrap();
        assert!((poses[0].towards.magnitude() - 1.0).abs() < 1e-6);
        assert!((poses[0].up.magnitude() - 1.0).abs() < 1e-6);
        assert_eq!(poses[0].towards, Vector3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = parse_camera_poses("0 0 5  0 0 -1  0 1 0  0.6981 0.9").unwrap_err();
        match err {
            PoseError::FieldCount { line, found } => {
                assert_eq!(line, 1);
                assert_eq!(found, 11);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_non_numeric_fields() {
        let contents = "0 0 5  0 0 -1  0 1 0  0.6981 0.6981 0.9\n0 0 5  0 0 -1  0 x 0  0.6981 0.6981 0.9";
        let err = parse_camera_poses(contents).unwrap_err();
        match err {
            PoseError::InvalidFloat { line, value } => {
                assert_eq!(line, 2);
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_zero_length_directions() {
        let err = parse_camera_poses("0 0 5  0 0 0  0 1 0  0.6981 0.6981 0.9").unwrap_err();
        assert!(matches!(err, PoseError::DegenerateDirection { line: 1 }));
    }
}
