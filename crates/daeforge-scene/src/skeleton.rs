//! Skeleton and bone structures

use daeforge_core::{Error, Mat4x4, Result};
use serde::{Deserialize, Serialize};

/// Skeleton for skinned meshes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Skeleton {
    /// All bones in the skeleton
    pub bones: Vec<Bone>,
    /// Translation from logical bone ids (as stored on vertices) to indices
    /// into `bones`. Entries of -1 map to no bone.
    pub bone_indices: Option<Vec<i32>>,
}

impl Skeleton {
    /// Create a new empty skeleton
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bone to the skeleton
    pub fn add_bone(&mut self, bone: Bone) -> usize {
        let idx = self.bones.len();
        self.bones.push(bone);
        idx
    }

    /// Get bone count
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Get bone by index
    pub fn get_bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// Find bone index by name
    pub fn find_bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Name of the parent of `bone_index`, if it has one
    pub fn parent_name(&self, bone_index: usize) -> Option<&str> {
        let parent = self.bones.get(bone_index)?.parent_index?;
        self.bones.get(parent).map(|b| b.name.as_str())
    }

    /// Get children of a bone
    pub fn children(&self, bone_index: usize) -> Vec<usize> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent_index == Some(bone_index))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of bones without a parent
    pub fn root_bones(&self) -> Vec<usize> {
        self.bones
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent_index.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Translate a logical bone id through `bone_indices`.
    ///
    /// Without a table the id is used directly. Ids that are negative, outside
    /// the table, or that land outside `bones` yield `None`.
    pub fn resolve_bone_id(&self, bone_id: i32) -> Option<usize> {
        let id = match &self.bone_indices {
            Some(table) => *table.get(usize::try_from(bone_id).ok()?)?,
            None => bone_id,
        };
        usize::try_from(id).ok().filter(|&i| i < self.bones.len())
    }

    /// Get bone chain from a bone to root
    pub fn bone_chain_to_root(&self, bone_index: usize) -> Vec<usize> {
        let mut chain = vec![bone_index];
        let mut current = bone_index;

        while let Some(parent) = self.bones.get(current).and_then(|b| b.parent_index) {
            // Guard against cycles in malformed input.
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }

        chain
    }

    /// Calculate world transform for a bone
    pub fn world_transform(&self, bone_index: usize) -> Mat4x4 {
        // Row-vector convention: world = local * parent_world
        self.bone_chain_to_root(bone_index)
            .iter()
            .filter_map(|&idx| self.bones.get(idx))
            .fold(Mat4x4::IDENTITY, |acc, bone| acc.multiply(&bone.local_transform))
    }

    /// Inverse bind matrix for a bone: the explicit one if present, otherwise
    /// the inverse of the bone's world transform.
    pub fn inverse_bind_transform(&self, bone_index: usize) -> Mat4x4 {
        if let Some(explicit) = self
            .bones
            .get(bone_index)
            .and_then(|b| b.inverse_bind_transform)
        {
            return explicit;
        }

        self.world_transform(bone_index)
            .inverse()
            .unwrap_or(Mat4x4::IDENTITY)
    }

    /// Validate skeleton structure
    pub fn validate(&self) -> Result<()> {
        for (idx, bone) in self.bones.iter().enumerate() {
            if let Some(parent) = bone.parent_index {
                if parent >= self.bones.len() {
                    return Err(Error::invalid_reference(format!(
                        "bone {} has invalid parent index {}",
                        bone.name, parent
                    )));
                }
                if parent == idx {
                    return Err(Error::invalid_reference(format!(
                        "bone {} references itself as parent",
                        bone.name
                    )));
                }
            }
        }

        if let Some(table) = &self.bone_indices {
            for (logical, &target) in table.iter().enumerate() {
                if target < -1 || target >= self.bones.len() as i32 {
                    return Err(Error::invalid_reference(format!(
                        "bone index table entry {logical} points at {target} ({} bones)",
                        self.bones.len()
                    )));
                }
            }
        }

        Ok(())
    }
}

/// A single bone in the skeleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bone {
    /// Bone name
    pub name: String,
    /// Parent bone index (None for root bones)
    pub parent_index: Option<usize>,
    /// Local transform matrix (relative to parent)
    pub local_transform: Mat4x4,
    /// Inverse bind pose, derived from the world transform when absent
    pub inverse_bind_transform: Option<Mat4x4>,
    /// Local translation
    pub position: [f32; 3],
    /// Local rotation as Euler angles in radians
    pub rotation: [f32; 3],
    /// Local scale
    pub scale: [f32; 3],
}

impl Bone {
    /// Create a new bone
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style parent
    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent_index = Some(parent);
        self
    }

    /// Set position in both the TRS fields and the local transform
    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self.local_transform.m[3][0] = position[0];
        self.local_transform.m[3][1] = position[1];
        self.local_transform.m[3][2] = position[2];
        self
    }

    /// Check if this is a root bone
    pub fn is_root(&self) -> bool {
        self.parent_index.is_none()
    }
}

impl Default for Bone {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent_index: None,
            local_transform: Mat4x4::IDENTITY,
            inverse_bind_transform: None,
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}
