//! Texture decoding and image output
//!
//! Decodes raw scene textures (block-compressed, swizzled alpha, plain and
//! half-float RGBA) to RGBA8 and hands the bitmaps to a [`TextureSink`] for
//! encoding.

mod converter;
mod decompressor;
mod sink;

pub use converter::{ImageFormat, TextureConverter};
pub use decompressor::{decode_a8_swizzled, decode_rgba, SWIZZLE_LUT};
pub use sink::{BatchQueue, ImmediateWriter, TextureSink};

use thiserror::Error;

/// Texture conversion errors
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Characters that may not appear in a file name on common platforms
const ILLEGAL_FILE_NAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Strip characters that are illegal in file names.
///
/// Used for both texture file names and the image names materials refer to,
/// so the two always agree.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && !ILLEGAL_FILE_NAME_CHARS.contains(c))
        .collect()
}
