//! Texture source data

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Pixel format of a texture's raw data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFormat {
    /// Uncompressed RGBA8
    Rgba8,
    /// Uncompressed BGRA8
    Bgra8,
    /// 8-bit alpha in 8x8 swizzled tiles, two bytes per pixel
    A8,
    /// Block Compressed 1 (DXT1)
    Bc1,
    /// Block Compressed 2 (DXT3)
    Bc2,
    /// Block Compressed 3 (DXT5)
    Bc3,
    /// Block Compressed 4
    Bc4,
    /// Block Compressed 5
    Bc5,
    /// Half-float RGBA
    Rgba16Float,
}

impl TextureFormat {
    /// Get block size for compressed formats
    pub fn block_size(&self) -> Option<usize> {
        match self {
            TextureFormat::Bc1 | TextureFormat::Bc4 => Some(8),
            TextureFormat::Bc2 | TextureFormat::Bc3 | TextureFormat::Bc5 => Some(16),
            _ => None,
        }
    }

    /// Check if format is block-compressed
    pub fn is_compressed(&self) -> bool {
        self.block_size().is_some()
    }

    /// Number of bytes a `width` x `height` image needs in this format
    pub fn data_len(&self, width: u32, height: u32) -> usize {
        let (w, h) = (width as usize, height as usize);
        match self.block_size() {
            Some(block) => w.div_ceil(4) * h.div_ceil(4) * block,
            None => {
                let bpp = match self {
                    // alpha byte plus one padding byte
                    TextureFormat::A8 => 2,
                    TextureFormat::Rgba16Float => 8,
                    _ => 4,
                };
                w * h * bpp
            }
        }
    }
}

/// Where an output channel takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelSource {
    Red,
    Green,
    Blue,
    Alpha,
    /// Constant 0x00
    Zero,
    /// Constant 0xFF
    One,
}

impl ChannelSource {
    /// Pick the value for this source out of an RGBA pixel
    pub fn select(&self, pixel: [u8; 4]) -> u8 {
        match self {
            ChannelSource::Red => pixel[0],
            ChannelSource::Green => pixel[1],
            ChannelSource::Blue => pixel[2],
            ChannelSource::Alpha => pixel[3],
            ChannelSource::Zero => 0x00,
            ChannelSource::One => 0xFF,
        }
    }
}

/// Component remap applied to decoded pixels, in R, G, B, A order.
///
/// Packed textures store e.g. a roughness map in the alpha channel; the map
/// says which decoded channel feeds each output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMap {
    pub red: ChannelSource,
    pub green: ChannelSource,
    pub blue: ChannelSource,
    pub alpha: ChannelSource,
}

impl ChannelMap {
    pub const IDENTITY: Self = Self {
        red: ChannelSource::Red,
        green: ChannelSource::Green,
        blue: ChannelSource::Blue,
        alpha: ChannelSource::Alpha,
    };

    pub fn new(
        red: ChannelSource,
        green: ChannelSource,
        blue: ChannelSource,
        alpha: ChannelSource,
    ) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Remap a single pixel
    pub fn apply(&self, pixel: [u8; 4]) -> [u8; 4] {
        [
            self.red.select(pixel),
            self.green.select(pixel),
            self.blue.select(pixel),
            self.alpha.select(pixel),
        ]
    }

    /// Remap a tightly packed RGBA buffer in place
    pub fn apply_in_place(&self, rgba: &mut [u8]) {
        if self.is_identity() {
            return;
        }
        for px in rgba.chunks_exact_mut(4) {
            let remapped = self.apply([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&remapped);
        }
    }
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A texture as handed over by the scene loader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Texture {
    /// Texture name, referenced by material texture maps
    pub name: String,
    /// Format of `data`
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    /// Raw pixel data
    #[serde(default)]
    pub data: Vec<u8>,
    /// File holding the raw pixel data, relative to the scene file.
    /// Read into `data` when the scene is loaded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    /// Component remap hint
    #[serde(default)]
    pub channel_map: ChannelMap,
}

impl Texture {
    pub fn new(
        name: impl Into<String>,
        format: TextureFormat,
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            width,
            height,
            data,
            data_file: None,
            channel_map: ChannelMap::IDENTITY,
        }
    }

    pub fn with_channel_map(mut self, channel_map: ChannelMap) -> Self {
        self.channel_map = channel_map;
        self
    }

    /// Bytes `data` should hold for the declared size and format
    pub fn expected_data_len(&self) -> usize {
        self.format.data_len(self.width, self.height)
    }
}
