//! Scene texture to bitmap conversion and image encoding

use std::path::Path;

use daeforge_scene::Texture;
use image::{ImageFormat as ImgFormat, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::textures::{decompressor, sanitize_file_name, TextureError, TextureResult};

/// Output image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless, good compression)
    #[default]
    Png,
    /// TGA format (lossless, simple)
    Tga,
    /// BMP format (lossless, no compression)
    Bmp,
}

impl ImageFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Tga => "tga",
            ImageFormat::Bmp => "bmp",
        }
    }

    /// Convert to image crate's format
    fn to_img_format(self) -> ImgFormat {
        match self {
            ImageFormat::Png => ImgFormat::Png,
            ImageFormat::Tga => ImgFormat::Tga,
            ImageFormat::Bmp => ImgFormat::Bmp,
        }
    }

    /// `<sanitized name>.<extension>`
    pub fn file_name(&self, texture_name: &str) -> String {
        format!("{}.{}", sanitize_file_name(texture_name), self.extension())
    }
}

/// Turns scene textures into bitmaps and bitmaps into files
#[derive(Debug, Clone, Copy)]
pub struct TextureConverter {
    format: ImageFormat,
    apply_channel_map: bool,
}

impl TextureConverter {
    pub fn new(format: ImageFormat, apply_channel_map: bool) -> Self {
        Self {
            format,
            apply_channel_map,
        }
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Decode a texture, applying its channel remap when enabled
    pub fn to_image(&self, texture: &Texture) -> TextureResult<RgbaImage> {
        let mut rgba =
            decompressor::decode_rgba(texture.format, &texture.data, texture.width, texture.height)?;

        if self.apply_channel_map {
            texture.channel_map.apply_in_place(&mut rgba);
        }

        RgbaImage::from_raw(texture.width, texture.height, rgba).ok_or(
            TextureError::DecompressionFailed(
                "Failed to create image from decompressed data".to_string(),
            ),
        )
    }

    /// Encode a bitmap to `path` in the configured format
    pub fn write_image(&self, img: &RgbaImage, path: &Path) -> TextureResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        img.save_with_format(path, self.format.to_img_format())?;
        Ok(())
    }
}

impl Default for TextureConverter {
    fn default() -> Self {
        Self::new(ImageFormat::Png, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daeforge_scene::{ChannelMap, ChannelSource, TextureFormat};

    fn packed_texture() -> Texture {
        Texture::new("packed", TextureFormat::Rgba8, 1, 1, vec![10, 20, 30, 40]).with_channel_map(
            ChannelMap::new(
                ChannelSource::Alpha,
                ChannelSource::Alpha,
                ChannelSource::Alpha,
                ChannelSource::One,
            ),
        )
    }

    #[test]
    fn test_channel_map_applied() {
        let img = TextureConverter::new(ImageFormat::Png, true)
            .to_image(&packed_texture())
            .unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [40, 40, 40, 255]);
    }

    #[test]
    fn test_channel_map_skipped() {
        let img = TextureConverter::new(ImageFormat::Png, false)
            .to_image(&packed_texture())
            .unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 40]);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(ImageFormat::Png.file_name("eye|alb"), "eyealb.png");
        assert_eq!(ImageFormat::Tga.file_name("eye"), "eye.tga");
    }

    #[test]
    fn test_write_image_creates_folder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("textures").join("packed.png");
        let converter = TextureConverter::default();
        let img = converter.to_image(&packed_texture()).unwrap();

        converter.write_image(&img, &path).unwrap();
        assert!(path.exists());
    }
}
