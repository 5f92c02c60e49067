//! Index buffer normalization to triangle lists

use daeforge_scene::PrimitiveType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// A strip needs at least one full triangle
    #[error("triangle strip has {len} indices, need at least 3")]
    Degenerate { len: usize },
}

/// Convert an index buffer of the given topology into a triangle list
pub fn to_triangle_list(indices: &[u32], topology: PrimitiveType) -> Result<Vec<u32>, TopologyError> {
    match topology {
        PrimitiveType::Triangles => Ok(indices.to_vec()),
        PrimitiveType::TriangleStrips => strip_to_list(indices),
    }
}

/// Decode a triangle strip.
///
/// Triangle `i` covers the window `(a, b, c) = (s[i], s[i+1], s[i+2])` and is
/// emitted as `(a, b, c)` for even `i` and `(b, a, c)` for odd `i`, so every
/// triangle keeps the winding of the first. Degenerate triangles are kept.
pub fn strip_to_list(strip: &[u32]) -> Result<Vec<u32>, TopologyError> {
    if strip.len() < 3 {
        return Err(TopologyError::Degenerate { len: strip.len() });
    }

    let mut list = Vec::with_capacity((strip.len() - 2) * 3);
    for (i, window) in strip.windows(3).enumerate() {
        let (a, b, c) = (window[0], window[1], window[2]);
        if i % 2 == 0 {
            list.extend_from_slice(&[a, b, c]);
        } else {
            list.extend_from_slice(&[b, a, c]);
        }
    }

    Ok(list)
}
