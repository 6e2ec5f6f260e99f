//! Export configuration and dataset path templates.
//!
//! The configuration surface is external and read-only: it names the dataset
//! root, the export resolution, the ordered render-buffer catalog entries to
//! produce, the ordered house corpus, and the shader used for buffer specs
//! without an override. Validation failures are fatal at startup and never
//! silently corrected.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("dataset root `{0}` must end with a path separator")]
    MissingRootSeparator(String),
    #[error("export dimension must be non-zero")]
    ZeroExportDim,
    #[error("no render buffer ids configured")]
    NoBufferIds,
    #[error("unknown render buffer id `{0}`")]
    UnknownBufferId(String),
    #[error("unknown shader `{0}`")]
    UnknownShader(String),
}

fn default_export_dim() -> u32 {
    256
}

fn default_shader() -> String {
    "albedo".to_string()
}

/// Read-only export configuration, loaded once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Dataset root. Must end with a path separator; every other path in the
    /// dataset is a template appended to this root.
    pub data_root: String,
    /// Edge length of the square export rasters.
    #[serde(default = "default_export_dim")]
    pub export_dim: u32,
    /// Ordered render-buffer catalog ids to produce per camera.
    pub buffer_ids: Vec<String>,
    /// Ordered house ids to process.
    pub houses: Vec<String>,
    /// Shader used when a buffer spec carries no override.
    #[serde(default = "default_shader")]
    pub default_shader: String,
}

impl ExportConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ExportConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate structural invariants. Catalog membership of `buffer_ids` and
    /// `default_shader` is checked against the render catalog when the
    /// exporter is constructed, so that this module stays free of render
    /// dependencies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let last = self.data_root.chars().last();
        if !matches!(last, Some('/') | Some('\\')) {
            return Err(ConfigError::MissingRootSeparator(self.data_root.clone()));
        }
        if self.export_dim == 0 {
            return Err(ConfigError::ZeroExportDim);
        }
        if self.buffer_ids.is_empty() {
            return Err(ConfigError::NoBufferIds);
        }
        Ok(())
    }

    pub fn house_json_path(&self, house_id: &str) -> PathBuf {
        PathBuf::from(format!("{}house/{}/house.json", self.data_root, house_id))
    }

    pub fn camera_path(&self, house_id: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}cameras/{}/room_camera.txt",
            self.data_root, house_id
        ))
    }

    pub fn object_obj_path(&self, model_id: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}object/{}/{}.obj",
            self.data_root, model_id, model_id
        ))
    }

    pub fn room_obj_path(&self, house_id: &str, model_id: &str, suffix: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}room/{}/{}{}.obj",
            self.data_root, house_id, model_id, suffix
        ))
    }

    pub fn texture_path(&self, texture_name: &str) -> PathBuf {
        PathBuf::from(format!("{}texture/{}.jpg", self.data_root, texture_name))
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(format!("{}output", self.data_root))
    }

    /// Output filenames encode house id, camera index and buffer id, so
    /// re-rendering the same house overwrites the same file set.
    pub fn output_path(&self, house_id: &str, camera_index: usize, buffer_id: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}output/{}_{}_{}.png",
            self.data_root, house_id, camera_index, buffer_id
        ))
    }
}
