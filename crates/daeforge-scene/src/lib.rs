//! daeforge-scene
//!
//! In-memory scene model handed to the exporters: meshes, materials, an
//! optional skeleton and raw textures. Scenes can be built in code or loaded
//! from a JSON description with [`load_scene`].
//!
//! # Example
//!
//! ```rust,ignore
//! use daeforge_scene::load_scene;
//!
//! let scene = load_scene("character.json")?;
//! println!("{} meshes, {} materials", scene.meshes.len(), scene.materials.len());
//! ```

pub mod material;
pub mod mesh;
pub mod skeleton;
pub mod texture;

use std::fs;
use std::path::Path;

use daeforge_core::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use material::{Material, TextureKind, TextureMap, UvTransform, WrapMode};
pub use mesh::{LodMesh, Mesh, PolygonGroup, PrimitiveType, Vertex};
pub use skeleton::{Bone, Skeleton};
pub use texture::{ChannelMap, ChannelSource, Texture, TextureFormat};

/// A complete scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub skeleton: Option<Skeleton>,
    pub textures: Vec<Texture>,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a scene from a JSON string without touching the filesystem
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidScene {
            message: e.to_string(),
        })
    }

    /// Number of bones in the skeleton, zero without one
    pub fn bone_count(&self) -> usize {
        self.skeleton.as_ref().map_or(0, Skeleton::bone_count)
    }

    /// Check that every index in the scene points at something that exists
    pub fn validate(&self) -> Result<()> {
        if let Some(skeleton) = &self.skeleton {
            skeleton.validate().context("skeleton")?;
        }

        let material_count = self.materials.len();
        let bone_count = self.bone_count();

        for (mesh_idx, mesh) in self.meshes.iter().enumerate() {
            let ctx = || format!("mesh {mesh_idx} ({})", mesh.name);

            if let Some(material) = mesh.material_index.filter(|&m| m >= material_count) {
                return Err(Error::invalid_reference(format!(
                    "material {material} of {material_count}"
                )).with_context(ctx()));
            }

            let bad_bone = mesh
                .bone_index
                .filter(|&b| self.skeleton.is_some() && b >= bone_count);
            if let Some(bone) = bad_bone {
                return Err(Error::invalid_reference(format!(
                    "fallback bone {bone} of {bone_count}"
                )).with_context(ctx()));
            }

            for (group_idx, group) in mesh.polygon_groups.iter().enumerate() {
                if let Some(material) = group.material_index.filter(|&m| m >= material_count) {
                    return Err(Error::invalid_reference(format!(
                        "polygon group {group_idx} material {material} of {material_count}"
                    )).with_context(ctx()));
                }
                check_faces(&group.faces, mesh.vertex_count())
                    .with_context(|| format!("{}, polygon group {group_idx}", ctx()))?;
            }

            for (lod_idx, lod) in mesh.lod_meshes.iter().enumerate() {
                check_faces(&lod.faces, mesh.vertex_count())
                    .with_context(|| format!("{}, lod {lod_idx}", ctx()))?;
            }
        }

        Ok(())
    }
}

fn check_faces(faces: &[u32], vertex_count: usize) -> Result<()> {
    match faces.iter().find(|&&i| i as usize >= vertex_count) {
        Some(bad) => Err(Error::invalid_reference(format!(
            "face index {bad} of {vertex_count} vertices"
        ))),
        None => Ok(()),
    }
}

/// Load and validate a JSON scene description.
///
/// Texture `data_file` entries are resolved relative to the scene file and
/// read into memory.
pub fn load_scene(path: impl AsRef<Path>) -> Result<Scene> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    info!(path = %path.display(), "Loading scene");

    let json = fs::read_to_string(path)?;
    let mut scene = Scene::from_json_str(&json)
        .with_context(|| format!("parsing {}", path.display()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    for texture in &mut scene.textures {
        if let Some(file) = texture.data_file.take() {
            let full = base.join(&file);
            debug!(texture = %texture.name, file = %full.display(), "Reading texture data");
            texture.data = fs::read(&full)
                .map_err(Error::from)
                .with_context(|| format!("texture {}", texture.name))?;
            texture.data_file = Some(file);
        }
    }

    scene.validate()?;

    debug!(
        meshes = scene.meshes.len(),
        materials = scene.materials.len(),
        textures = scene.textures.len(),
        bones = scene.bone_count(),
        "Scene loaded"
    );

    Ok(scene)
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn triangle_scene() -> Scene {
        let mut mesh = Mesh::new("tri");
        mesh.vertices = vec![
            Vertex::new([0.0, 0.0, 0.0]),
            Vertex::new([1.0, 0.0, 0.0]),
            Vertex::new([0.0, 1.0, 0.0]),
        ];
        mesh.polygon_groups = vec![PolygonGroup::triangles(Some(0), vec![0, 1, 2])];

        Scene {
            meshes: vec![mesh],
            materials: vec![Material::new("Skin")],
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_scene() {
        assert!(triangle_scene().validate().is_ok());
    }

    #[test]
    fn test_bad_material_index() {
        let mut scene = triangle_scene();
        scene.meshes[0].polygon_groups[0].material_index = Some(3);
        let err = scene.validate().unwrap_err();
        assert!(err.is_scene_error());
        assert!(err.to_string().contains("tri"));
    }

    #[test]
    fn test_bad_face_index() {
        let mut scene = triangle_scene();
        scene.meshes[0].polygon_groups[0].faces.push(9);
        assert!(scene.validate().is_err());
    }

    #[test]
    fn test_fallback_bone_without_skeleton_is_ignored() {
        let mut scene = triangle_scene();
        scene.meshes[0].bone_index = Some(5);
        assert!(scene.validate().is_ok());

        scene.skeleton = Some(Skeleton::new());
        assert!(scene.validate().is_err());
    }

    #[test]
    fn test_zero_size_texture_is_left_to_the_decoder() {
        let mut scene = triangle_scene();
        scene.textures.push(Texture::new("empty", TextureFormat::Rgba8, 0, 0, Vec::new()));
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_from_json_str_reports_invalid_scene() {
        let err = Scene::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::InvalidScene { .. }));
    }

    #[test]
    fn test_load_scene_reads_texture_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("alpha.raw"), vec![0x80u8; 128]).unwrap();

        let scene_path = dir.path().join("scene.json");
        let mut file = fs::File::create(&scene_path).unwrap();
        write!(
            file,
            r#"{{
                "textures": [
                    {{"name": "alpha", "format": "a8", "width": 8, "height": 8, "data_file": "alpha.raw"}}
                ]
            }}"#
        )
        .unwrap();

        let scene = load_scene(&scene_path).unwrap();
        assert_eq!(scene.textures[0].data.len(), 128);
        assert_eq!(scene.textures[0].expected_data_len(), 128);
    }

    #[test]
    fn test_load_scene_missing_file() {
        let err = load_scene("/definitely/not/here.json").unwrap_err();
        assert!(err.is_not_found());
    }
}
