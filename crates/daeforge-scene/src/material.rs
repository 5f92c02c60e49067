//! Material and texture-map definitions

use daeforge_core::Vec2;
use serde::{Deserialize, Serialize};

/// What a texture map is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureKind {
    Diffuse,
    Normal,
    Specular,
    Emission,
    AmbientOcclusion,
    Shadow,
    Light,
    Sphere,
    Other,
}

/// Texture addressing mode along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    #[default]
    Repeat,
    Mirror,
    Clamp,
}

/// UV scale/translate applied as `uv * scale + translate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UvTransform {
    pub scale: Vec2,
    pub translate: Vec2,
}

impl UvTransform {
    pub const IDENTITY: Self = Self {
        scale: Vec2::ONE,
        translate: Vec2::ZERO,
    };

    pub fn new(scale: Vec2, translate: Vec2) -> Self {
        Self { scale, translate }
    }

    /// Apply the transform to one coordinate
    pub fn apply(&self, uv: [f32; 2]) -> [f32; 2] {
        (Vec2::from(uv) * self.scale + self.translate).to_array()
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for UvTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A texture slot on a material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureMap {
    /// Name of the texture this slot samples
    pub name: String,
    /// Role of the slot
    pub kind: TextureKind,
    #[serde(default)]
    pub wrap_s: WrapMode,
    #[serde(default)]
    pub wrap_t: WrapMode,
    /// Optional UV transform for this slot
    #[serde(default)]
    pub transform: Option<UvTransform>,
}

impl TextureMap {
    pub fn new(name: impl Into<String>, kind: TextureKind) -> Self {
        Self {
            name: name.into(),
            kind,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            transform: None,
        }
    }

    pub fn with_wrap(mut self, wrap_s: WrapMode, wrap_t: WrapMode) -> Self {
        self.wrap_s = wrap_s;
        self.wrap_t = wrap_t;
        self
    }

    pub fn with_transform(mut self, transform: UvTransform) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// A named material with its texture slots
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub name: String,
    pub texture_maps: Vec<TextureMap>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture_maps: Vec::new(),
        }
    }

    pub fn with_map(mut self, map: TextureMap) -> Self {
        self.texture_maps.push(map);
        self
    }

    /// First diffuse slot, if any
    pub fn diffuse_map(&self) -> Option<&TextureMap> {
        self.texture_maps.iter().find(|m| m.kind == TextureKind::Diffuse)
    }

    /// UV transform of the first diffuse slot, identity when absent
    pub fn diffuse_uv_transform(&self) -> UvTransform {
        self.diffuse_map()
            .and_then(|m| m.transform)
            .unwrap_or_default()
    }
}
