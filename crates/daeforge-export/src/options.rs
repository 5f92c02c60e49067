//! Export configuration

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use daeforge_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::textures::ImageFormat;

/// Up axis recorded in the document's asset header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpAxis {
    #[serde(rename = "X_UP")]
    XUp,
    #[default]
    #[serde(rename = "Y_UP")]
    YUp,
    #[serde(rename = "Z_UP")]
    ZUp,
}

impl UpAxis {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpAxis::XUp => "X_UP",
            UpAxis::YUp => "Y_UP",
            UpAxis::ZUp => "Z_UP",
        }
    }
}

/// Options for a COLLADA export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Drop skin influences whose weight is exactly zero
    pub optimize_zero_weights: bool,
    /// Detect and write vertex color channels
    pub use_vertex_colors: bool,
    /// Flip texture coordinates into the document's UV space
    pub fix_tex_coords: bool,
    /// Only write joints referenced by skin data
    pub only_export_rigged_bones: bool,
    /// Apply each texture's channel remap before encoding
    pub use_texture_channel_components: bool,
    /// Apply per-material diffuse UV transforms
    pub apply_uv_transforms: bool,
    /// Write texture image files next to the document
    pub export_textures: bool,
    /// Encoder used for texture files
    pub image_format: ImageFormat,
    /// Sub-folder for texture files, relative to the document
    pub image_folder: PathBuf,
    /// Queue texture encoding and run it after the document is written
    pub batch_textures: bool,
    /// COLLADA `version` attribute
    pub file_version: String,
    pub up_axis: UpAxis,
    pub authoring_tool: String,
    /// RFC 3339 stamp for `created`/`modified`; the current time when unset
    pub timestamp: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            optimize_zero_weights: true,
            use_vertex_colors: false,
            fix_tex_coords: true,
            only_export_rigged_bones: false,
            use_texture_channel_components: true,
            apply_uv_transforms: true,
            export_textures: true,
            image_format: ImageFormat::Png,
            image_folder: PathBuf::new(),
            batch_textures: false,
            file_version: "1.4.1".to_string(),
            up_axis: UpAxis::YUp,
            authoring_tool: "daeforge".to_string(),
            timestamp: None,
        }
    }
}

impl ExportOptions {
    /// Load options from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let json = fs::read_to_string(path)?;
        let options: Self = serde_json::from_str(&json)
            .map_err(|e| Error::invalid_config(format!("{}: {e}", path.display())))?;
        options.validate()?;
        Ok(options)
    }

    /// Check option values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if let Some(stamp) = &self.timestamp {
            DateTime::parse_from_rfc3339(stamp)
                .map_err(|e| Error::invalid_config(format!("timestamp {stamp:?}: {e}")))?;
        }
        if self.image_folder.is_absolute() {
            return Err(Error::invalid_config(format!(
                "image folder {} must be relative to the document",
                self.image_folder.display()
            )));
        }
        Ok(())
    }

    /// Stamp written into the asset header
    pub fn resolved_timestamp(&self) -> String {
        match &self.timestamp {
            Some(stamp) => stamp.clone(),
            None => Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}
