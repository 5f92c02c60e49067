//! COLLADA 1.4 document writer
//!
//! The document is built in memory section by section and written to disk in
//! one step by [`DocumentWriter::finalize`]. Section order in the file:
//!
//! | Section | Contents |
//! |---------|----------|
//! | `asset` | contributor, timestamps, unit, up axis |
//! | `library_images` | one `<image>` per texture name |
//! | `library_materials` | one `<material>` per resolved material |
//! | `library_effects` | phong effects with diffuse and bump samplers |
//! | `library_nodes` | the joint hierarchy |
//! | `library_geometries` | one `<geometry>` per mesh |
//! | `library_controllers` | skin controllers of skinned meshes |
//! | `library_visual_scenes` | a node per mesh plus the skeleton |
//! | `scene` | instantiates the visual scene |

mod state;
mod writer;
mod xml;

pub use state::WriterState;
pub use writer::DocumentWriter;

use daeforge_core::Mat4x4;

use crate::options::{ExportOptions, UpAxis};

/// COLLADA 1.4 schema namespace
pub const COLLADA_NAMESPACE: &str = "http://www.collada.org/2005/11/COLLADASchema";

/// Contents of the `<asset>` header
#[derive(Debug, Clone, PartialEq)]
pub struct AssetInfo {
    pub authoring_tool: String,
    /// RFC 3339, used for both `created` and `modified`
    pub timestamp: String,
    pub up_axis: UpAxis,
}

impl AssetInfo {
    pub fn from_options(options: &ExportOptions) -> Self {
        Self {
            authoring_tool: options.authoring_tool.clone(),
            timestamp: options.resolved_timestamp(),
            up_axis: options.up_axis,
        }
    }
}

/// An image declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEntry {
    pub name: String,
    /// Path of the image file relative to the document
    pub file: String,
}

/// A joint to write into the hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct JointEntry {
    pub name: String,
    /// Index of the parent in the slice passed to `write_joints`
    pub parent: Option<usize>,
    /// Transform relative to the parent, row-vector convention
    pub transform: Mat4x4,
    pub inverse_bind: Mat4x4,
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

/// Vertex attribute stream of a geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semantic {
    Position,
    Normal,
    Color,
    TexCoord,
}

impl Semantic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Semantic::Position => "POSITION",
            Semantic::Normal => "NORMAL",
            Semantic::Color => "COLOR",
            Semantic::TexCoord => "TEXCOORD",
        }
    }

    /// Floats per vertex
    pub fn stride(&self) -> usize {
        self.params().len()
    }

    /// Accessor parameter names
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Semantic::Position | Semantic::Normal => &["X", "Y", "Z"],
            Semantic::Color => &["R", "G", "B", "A"],
            Semantic::TexCoord => &["S", "T"],
        }
    }

    /// Whether the stream carries a `set` attribute
    fn has_set(&self) -> bool {
        matches!(self, Semantic::Color | Semantic::TexCoord)
    }
}

/// Indices of a triangle list and the material symbol bound to it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriangleList {
    pub material: Option<String>,
    pub indices: Vec<u32>,
}

impl TriangleList {
    pub fn new(material: Option<String>, indices: Vec<u32>) -> Self {
        Self { material, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
