//! Material deduplication and texture resolution

use daeforge_scene::{Material, TextureKind, Texture, WrapMode};
use tracing::debug;

use crate::names::UniqueNames;
use crate::textures::sanitize_file_name;

/// Texture names containing any of these are utility maps and never exported.
/// Matching is case-sensitive.
pub const TEXTURE_DENY_LIST: [&str; 7] = [
    "dummy_col",
    "Default_lta",
    "projection_effect_col",
    "emi",
    "amb",
    "ita",
    "env",
];

/// Whether a texture passes the deny-list
pub fn is_exportable_texture(name: &str) -> bool {
    !TEXTURE_DENY_LIST.iter().any(|pattern| name.contains(pattern))
}

/// Shading role a texture map keeps in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapRole {
    Diffuse,
    Bump,
}

impl MapRole {
    /// Only diffuse and normal maps carry over
    pub fn from_kind(kind: TextureKind) -> Option<Self> {
        match kind {
            TextureKind::Diffuse => Some(MapRole::Diffuse),
            TextureKind::Normal => Some(MapRole::Bump),
            _ => None,
        }
    }
}

/// A texture map that survived role filtering
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTextureMap {
    /// File-safe texture name
    pub name: String,
    pub role: MapRole,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
}

/// A material under its document-unique name
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMaterial {
    pub name: String,
    /// Index of the source material in the scene
    pub source_index: usize,
    pub maps: Vec<ResolvedTextureMap>,
}

/// Output of [`resolve_materials`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedMaterials {
    /// One entry per scene material, in scene order
    pub materials: Vec<ResolvedMaterial>,
    /// Image names to declare, in first-seen order, without duplicates
    pub texture_names: Vec<String>,
}

impl ResolvedMaterials {
    /// Document name of the scene material at `index`
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.materials.get(index).map(|m| m.name.as_str())
    }
}

/// Deduplicate material names, filter texture maps and build the image list.
///
/// When the scene carries no textures at all, the names referenced by the
/// retained texture maps are declared instead so the images can be supplied
/// later.
pub fn resolve_materials(materials: &[Material], textures: &[Texture]) -> ResolvedMaterials {
    let mut names = UniqueNames::new();
    let mut resolved = ResolvedMaterials::default();

    for texture in textures {
        if !is_exportable_texture(&texture.name) {
            debug!(texture = %texture.name, "Texture filtered by deny-list");
            continue;
        }
        push_unique(&mut resolved.texture_names, sanitize_file_name(&texture.name));
    }

    for (source_index, material) in materials.iter().enumerate() {
        let name = names.claim(&material.name);
        if name != material.name {
            debug!(original = %material.name, renamed = %name, "Renamed duplicate material");
        }

        let maps: Vec<ResolvedTextureMap> = material
            .texture_maps
            .iter()
            .filter_map(|map| {
                Some(ResolvedTextureMap {
                    name: sanitize_file_name(&map.name),
                    role: MapRole::from_kind(map.kind)?,
                    wrap_s: map.wrap_s,
                    wrap_t: map.wrap_t,
                })
            })
            .collect();

        if textures.is_empty() {
            for map in &maps {
                push_unique(&mut resolved.texture_names, map.name.clone());
            }
        }

        resolved.materials.push(ResolvedMaterial {
            name,
            source_index,
            maps,
        });
    }

    resolved
}

fn push_unique(list: &mut Vec<String>, name: String) {
    if !list.contains(&name) {
        list.push(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daeforge_scene::{TextureFormat, TextureMap};
    use proptest::prelude::*;

    fn texture(name: &str) -> Texture {
        Texture::new(name, TextureFormat::Rgba8, 1, 1, vec![0; 4])
    }

    #[test]
    fn test_duplicate_material_renamed() {
        let materials = vec![
            Material::new("Skin").with_map(TextureMap::new("skin_a", TextureKind::Diffuse)),
            Material::new("Skin").with_map(TextureMap::new("skin_b", TextureKind::Diffuse)),
        ];
        let resolved = resolve_materials(&materials, &[]);

        assert_eq!(resolved.name_of(0), Some("Skin"));
        assert_eq!(resolved.name_of(1), Some("Skin_1"));
        assert_eq!(resolved.materials[1].maps[0].name, "skin_b");
        assert_eq!(resolved.materials[1].source_index, 1);
    }

    #[test]
    fn test_only_diffuse_and_normal_kept() {
        let materials = vec![Material::new("Body")
            .with_map(TextureMap::new("body_alb", TextureKind::Diffuse))
            .with_map(TextureMap::new("body_spm", TextureKind::Specular))
            .with_map(
                TextureMap::new("body_nrm", TextureKind::Normal)
                    .with_wrap(WrapMode::Mirror, WrapMode::Clamp),
            )];
        let resolved = resolve_materials(&materials, &[texture("body_alb")]);

        let maps = &resolved.materials[0].maps;
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].role, MapRole::Diffuse);
        assert_eq!(maps[1].role, MapRole::Bump);
        assert_eq!(maps[1].wrap_s, WrapMode::Mirror);
        assert_eq!(maps[1].wrap_t, WrapMode::Clamp);
    }

    #[test]
    fn test_deny_list_filters_textures() {
        let textures = vec![
            texture("body_alb"),
            texture("body_emi"),
            texture("dummy_col"),
            texture("cube_env"),
            texture("body_alb"),
        ];
        let resolved = resolve_materials(&[Material::new("Body")], &textures);
        assert_eq!(resolved.texture_names, vec!["body_alb".to_string()]);
    }

    #[test]
    fn test_deny_list_is_case_sensitive() {
        assert!(!is_exportable_texture("face_amb"));
        assert!(is_exportable_texture("face_AMB"));
    }

    #[test]
    fn test_no_textures_declares_map_names() {
        let materials = vec![
            Material::new("Body")
                .with_map(TextureMap::new("body_alb", TextureKind::Diffuse))
                .with_map(TextureMap::new("body_spm", TextureKind::Specular)),
            Material::new("Head").with_map(TextureMap::new("body_alb", TextureKind::Diffuse)),
        ];
        let resolved = resolve_materials(&materials, &[]);
        assert_eq!(resolved.texture_names, vec!["body_alb".to_string()]);
    }

    #[test]
    fn test_map_names_are_sanitized() {
        let materials =
            vec![Material::new("Body").with_map(TextureMap::new("body:alb?", TextureKind::Diffuse))];
        let resolved = resolve_materials(&materials, &[texture("body:alb?")]);
        assert_eq!(resolved.materials[0].maps[0].name, "bodyalb");
        assert_eq!(resolved.texture_names, vec!["bodyalb".to_string()]);
    }

    proptest! {
        #[test]
        fn test_denied_names_never_listed(
            prefix in "[a-z_]{0,8}",
            suffix in "[a-z_]{0,8}",
            pattern in prop::sample::select(TEXTURE_DENY_LIST.to_vec()),
        ) {
            let name = format!("{prefix}{pattern}{suffix}");
            let resolved = resolve_materials(&[Material::new("m")], &[texture(&name)]);
            prop_assert!(resolved.texture_names.is_empty());
        }
    }
}
