//! Mesh data structures

use serde::{Deserialize, Serialize};

/// Opaque white, the "no color" sentinel for vertex colors
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Number of UV channels a vertex can carry
pub const UV_CHANNELS: usize = 3;

/// Number of color channels a vertex can carry
pub const COLOR_CHANNELS: usize = 2;

/// Influences read per vertex unless a mesh says otherwise
pub const DEFAULT_SKIN_COUNT: usize = 4;

/// Index buffer topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    /// Every three indices form a triangle
    #[default]
    Triangles,
    /// Sliding-window triangle strip
    TriangleStrips,
}

/// A mesh with its vertices and material-bound face groups
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Mesh {
    /// Mesh name
    pub name: String,
    /// All vertices
    pub vertices: Vec<Vertex>,
    /// Face groups, each bound to one material
    pub polygon_groups: Vec<PolygonGroup>,
    /// Level-of-detail index buffers
    pub lod_meshes: Vec<LodMesh>,
    /// Which entry of `lod_meshes` is displayed
    pub display_lod_index: usize,
    /// Mesh-level material, used by faces without their own binding
    pub material_index: Option<usize>,
    /// Bone that rigid (unskinned) vertices are bound to
    pub bone_index: Option<usize>,
    /// Maximum number of skin influences read per vertex
    pub vertex_skin_count: usize,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            name: String::new(),
            vertices: Vec::new(),
            polygon_groups: Vec::new(),
            lod_meshes: Vec::new(),
            display_lod_index: 0,
            material_index: None,
            bone_index: None,
            vertex_skin_count: DEFAULT_SKIN_COUNT,
        }
    }
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check if any vertex references a bone, or the mesh is rigidly bound
    pub fn is_skinned(&self) -> bool {
        self.bone_index.is_some() || self.vertices.iter().any(|v| !v.bone_ids.is_empty())
    }

    /// The displayed LOD, if the mesh has any
    pub fn display_lod(&self) -> Option<&LodMesh> {
        self.lod_meshes.get(self.display_lod_index)
    }

    /// Total number of indices across all groups and the displayed LOD
    pub fn index_count(&self) -> usize {
        let lod = self.display_lod().map_or(0, |l| l.faces.len());
        lod + self.polygon_groups.iter().map(|g| g.faces.len()).sum::<usize>()
    }

    /// Calculate the axis-aligned bounds of all vertex positions
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for vertex in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(vertex.position[i]);
                max[i] = max[i].max(vertex.position[i]);
            }
        }

        Some((min, max))
    }
}

/// A single vertex with all attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],
    /// Normal vector; the zero vector means "no normal"
    pub normal: [f32; 3],
    /// UV coordinates; zero means "unused"
    pub uv: [[f32; 2]; UV_CHANNELS],
    /// RGBA colors; opaque white means "unused"
    pub colors: [[f32; 4]; COLOR_CHANNELS],
    /// Logical bone ids, in influence order
    pub bone_ids: Vec<i32>,
    /// Weights for `bone_ids`; may be shorter than `bone_ids`
    pub bone_weights: Vec<f32>,
}

impl Vertex {
    /// Create a vertex with just position
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder-style normal
    pub fn with_normal(mut self, normal: [f32; 3]) -> Self {
        self.normal = normal;
        self
    }

    /// Builder-style first UV channel
    pub fn with_uv(mut self, uv: [f32; 2]) -> Self {
        self.uv[0] = uv;
        self
    }

    /// Builder-style skin influences
    pub fn with_influences(mut self, bone_ids: Vec<i32>, bone_weights: Vec<f32>) -> Self {
        self.bone_ids = bone_ids;
        self.bone_weights = bone_weights;
        self
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            normal: [0.0; 3],
            uv: [[0.0; 2]; UV_CHANNELS],
            colors: [WHITE; COLOR_CHANNELS],
            bone_ids: Vec::new(),
            bone_weights: Vec::new(),
        }
    }
}

/// A subset of a mesh's faces sharing one material binding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolygonGroup {
    /// Material index into the scene's material list
    pub material_index: Option<usize>,
    /// Topology of `faces`
    pub primitive_type: PrimitiveType,
    /// Vertex indices
    pub faces: Vec<u32>,
}

impl PolygonGroup {
    /// Triangle-list group bound to a material
    pub fn triangles(material_index: Option<usize>, faces: Vec<u32>) -> Self {
        Self {
            material_index,
            primitive_type: PrimitiveType::Triangles,
            faces,
        }
    }

    /// Triangle-strip group bound to a material
    pub fn strips(material_index: Option<usize>, faces: Vec<u32>) -> Self {
        Self {
            material_index,
            primitive_type: PrimitiveType::TriangleStrips,
            faces,
        }
    }
}

/// A level-of-detail index buffer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LodMesh {
    /// Topology of `faces`
    pub primitive_type: PrimitiveType,
    /// Vertex indices
    pub faces: Vec<u32>,
}
