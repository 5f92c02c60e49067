//! Per-channel vertex attribute collection

use daeforge_scene::mesh::{COLOR_CHANNELS, UV_CHANNELS, WHITE};
use daeforge_scene::Mesh;

/// Flat attribute buffers of one mesh plus which channels carry data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryAttributes {
    /// xyz per vertex
    pub positions: Vec<f32>,
    /// xyz per vertex
    pub normals: Vec<f32>,
    /// rgba per vertex, per color set
    pub colors: [Vec<f32>; COLOR_CHANNELS],
    /// uv per vertex, per texture coordinate set
    pub uvs: [Vec<f32>; UV_CHANNELS],
    pub has_normals: bool,
    pub has_colors: [bool; COLOR_CHANNELS],
    pub has_uvs: [bool; UV_CHANNELS],
    /// Any vertex declares skin influences
    pub has_bone_ids: bool,
}

impl GeometryAttributes {
    /// Number of vertices the buffers describe
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Recompute UV presence after the buffers were modified
    pub fn refresh_uv_presence(&mut self, set: usize) {
        if let Some(uv) = self.uvs.get(set) {
            self.has_uvs[set] = uv.chunks_exact(2).any(|c| c[0] != 0.0 || c[1] != 0.0);
        }
    }
}

/// Walk the mesh's vertices once, filling every buffer and presence flag.
///
/// Color channels only count as present when `use_vertex_colors` is set; a
/// color equal to opaque white means "no color".
pub fn collect_attributes(mesh: &Mesh, use_vertex_colors: bool) -> GeometryAttributes {
    let count = mesh.vertex_count();
    let mut attrs = GeometryAttributes {
        positions: Vec::with_capacity(count * 3),
        normals: Vec::with_capacity(count * 3),
        colors: std::array::from_fn(|_| Vec::with_capacity(count * 4)),
        uvs: std::array::from_fn(|_| Vec::with_capacity(count * 2)),
        ..Default::default()
    };

    for vertex in &mesh.vertices {
        attrs.positions.extend_from_slice(&vertex.position);
        attrs.normals.extend_from_slice(&vertex.normal);
        if vertex.normal != [0.0; 3] {
            attrs.has_normals = true;
        }

        for (set, color) in vertex.colors.iter().enumerate() {
            attrs.colors[set].extend_from_slice(color);
            if use_vertex_colors && *color != WHITE {
                attrs.has_colors[set] = true;
            }
        }

        for (set, uv) in vertex.uv.iter().enumerate() {
            attrs.uvs[set].extend_from_slice(uv);
            if *uv != [0.0; 2] {
                attrs.has_uvs[set] = true;
            }
        }

        if !vertex.bone_ids.is_empty() {
            attrs.has_bone_ids = true;
        }
    }

    attrs
}
