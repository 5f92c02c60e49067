//! Raw texture decoding to RGBA8
//!
//! Block-compressed formats go through the texpresso library; swizzled alpha
//! and half-float data are decoded here.

use daeforge_scene::TextureFormat;
use half::f16;

use crate::textures::{TextureError, TextureResult};

/// Maps a linear pixel index inside an 8x8 tile to its `y * 8 + x` position
pub const SWIZZLE_LUT: [u8; 64] = [
    0, 1, 8, 9, 2, 3, 10, 11, 16, 17, 24, 25, 18, 19, 26, 27, 4, 5, 12, 13, 6, 7, 14, 15, 20, 21,
    28, 29, 22, 23, 30, 31, 32, 33, 40, 41, 34, 35, 42, 43, 48, 49, 56, 57, 50, 51, 58, 59, 36,
    37, 44, 45, 38, 39, 46, 47, 52, 53, 60, 61, 54, 55, 62, 63,
];

/// Decode texture data to tightly packed RGBA8
pub fn decode_rgba(
    format: TextureFormat,
    data: &[u8],
    width: u32,
    height: u32,
) -> TextureResult<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(TextureError::InvalidDimensions { width, height });
    }

    let expected = format.data_len(width, height);
    if data.len() < expected {
        return Err(TextureError::DecompressionFailed(format!(
            "{format:?} data size mismatch: expected {expected}, got {}",
            data.len()
        )));
    }

    let pixel_count = width as usize * height as usize;
    let mut output = vec![0u8; pixel_count * 4];

    match format {
        TextureFormat::Rgba8 => output.copy_from_slice(&data[..expected]),
        TextureFormat::Bgra8 => {
            for (dst, src) in output.chunks_exact_mut(4).zip(data.chunks_exact(4)) {
                dst[0] = src[2]; // R <- B
                dst[1] = src[1];
                dst[2] = src[0]; // B <- R
                dst[3] = src[3];
            }
        }
        TextureFormat::A8 => return decode_a8_swizzled(data, width, height),
        TextureFormat::Rgba16Float => {
            for (dst, src) in output.chunks_exact_mut(4).zip(data.chunks_exact(8)) {
                for c in 0..4 {
                    let value = f16::from_le_bytes([src[c * 2], src[c * 2 + 1]]).to_f32();
                    dst[c] = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
                }
            }
        }
        TextureFormat::Bc1 => decompress_block(texpresso::Format::Bc1, data, width, height, &mut output),
        TextureFormat::Bc2 => decompress_block(texpresso::Format::Bc2, data, width, height, &mut output),
        TextureFormat::Bc3 => decompress_block(texpresso::Format::Bc3, data, width, height, &mut output),
        TextureFormat::Bc4 => decompress_block(texpresso::Format::Bc4, data, width, height, &mut output),
        TextureFormat::Bc5 => decompress_block(texpresso::Format::Bc5, data, width, height, &mut output),
    }

    Ok(output)
}

fn decompress_block(
    format: texpresso::Format,
    data: &[u8],
    width: u32,
    height: u32,
    output: &mut [u8],
) {
    format.decompress(data, width as usize, height as usize, output);
}

/// Bytes per stored A8 pixel; only the first byte of each pair is alpha
pub const A8_PIXEL_STRIDE: usize = 2;

/// Decode 8-bit alpha stored in 8x8 swizzled tiles.
///
/// Tiles are read left to right, top to bottom; pixels inside a tile follow
/// [`SWIZZLE_LUT`]. Each pixel occupies [`A8_PIXEL_STRIDE`] bytes and the
/// alpha is the first of them. Rows land in the output bottom-up. Color
/// channels are set to 0xFF.
pub fn decode_a8_swizzled(data: &[u8], width: u32, height: u32) -> TextureResult<Vec<u8>> {
    if width == 0 || height == 0 || width % 8 != 0 || height % 8 != 0 {
        return Err(TextureError::InvalidDimensions { width, height });
    }

    let (w, h) = (width as usize, height as usize);
    let expected = w * h * A8_PIXEL_STRIDE;
    if data.len() < expected {
        return Err(TextureError::DecompressionFailed(format!(
            "A8 data size mismatch: expected {expected}, got {}",
            data.len()
        )));
    }

    let mut output = vec![0u8; w * h * 4];
    let mut input = data.iter().step_by(A8_PIXEL_STRIDE);

    for ty in (0..h).step_by(8) {
        for tx in (0..w).step_by(8) {
            for &swizzled in &SWIZZLE_LUT {
                let x = (swizzled & 7) as usize;
                let y = (swizzled >> 3) as usize;
                let offset = (tx + x + (h - 1 - (ty + y)) * w) * 4;

                let alpha = input.next().copied().unwrap_or_default();
                output[offset] = 0xFF;
                output[offset + 1] = 0xFF;
                output[offset + 2] = 0xFF;
                output[offset + 3] = alpha;
            }
        }
    }

    Ok(output)
}
