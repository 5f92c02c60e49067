//! Per-vertex skin influence remapping

use daeforge_scene::{Mesh, Skeleton, Vertex};

/// Influences of one vertex after remapping. `indices` are skeleton bone
/// indices and always pair up with `weights`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexInfluences {
    pub indices: Vec<usize>,
    pub weights: Vec<f32>,
}

impl VertexInfluences {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.indices.iter().copied().zip(self.weights.iter().copied())
    }
}

/// Remaps raw vertex influences of one mesh onto skeleton bone indices
#[derive(Debug, Clone, Copy)]
pub struct SkinRemapper<'a> {
    skeleton: Option<&'a Skeleton>,
    max_influences: usize,
    fallback_bone: Option<usize>,
    optimize_zero_weights: bool,
}

impl<'a> SkinRemapper<'a> {
    pub fn new(skeleton: Option<&'a Skeleton>, mesh: &Mesh, optimize_zero_weights: bool) -> Self {
        Self {
            skeleton,
            max_influences: mesh.vertex_skin_count,
            fallback_bone: mesh.bone_index,
            optimize_zero_weights,
        }
    }

    /// Remap one vertex.
    ///
    /// Influences past the mesh's cap, with an explicit zero weight, or whose
    /// bone id does not resolve are dropped. With no weights at all every
    /// survivor gets 1.0; otherwise survivors without a weight are dropped.
    /// An empty result on a rigidly bound mesh becomes `(fallback, 1.0)`.
    pub fn remap(&self, vertex: &Vertex) -> VertexInfluences {
        let mut kept: Vec<(usize, Option<f32>)> = Vec::new();

        for (slot, &bone_id) in vertex.bone_ids.iter().enumerate().take(self.max_influences) {
            let weight = vertex.bone_weights.get(slot).copied();
            if self.optimize_zero_weights && weight == Some(0.0) {
                continue;
            }

            let Some(index) = self.skeleton.and_then(|s| s.resolve_bone_id(bone_id)) else {
                continue;
            };
            kept.push((index, weight));
        }

        let mut out = VertexInfluences::default();
        if kept.iter().all(|(_, w)| w.is_none()) {
            for (index, _) in kept {
                out.indices.push(index);
                out.weights.push(1.0);
            }
        } else {
            for (index, weight) in kept {
                if let Some(weight) = weight {
                    out.indices.push(index);
                    out.weights.push(weight);
                }
            }
        }

        if out.is_empty() {
            if let Some(bone) = self.fallback_bone {
                out.indices.push(bone);
                out.weights.push(1.0);
            }
        }

        out
    }

    /// Remap every vertex of a mesh
    pub fn remap_all(&self, vertices: &[Vertex]) -> Vec<VertexInfluences> {
        vertices.iter().map(|v| self.remap(v)).collect()
    }
}
