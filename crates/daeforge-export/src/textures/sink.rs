//! Destinations for decoded texture bitmaps

use std::path::PathBuf;

use image::RgbaImage;
use tracing::{debug, warn};

use crate::textures::{TextureConverter, TextureError, TextureResult};

/// Receives finished bitmaps. Submitting moves the bitmap into the sink; the
/// caller keeps no handle to it.
pub trait TextureSink {
    /// Hand over the bitmap for texture `name`, to be written to `path`
    fn submit(&mut self, name: &str, image: RgbaImage, path: PathBuf) -> TextureResult<()>;

    /// Finish deferred work, returning the textures that failed
    fn flush(&mut self) -> Vec<(String, TextureError)> {
        Vec::new()
    }
}

/// Encodes every bitmap as soon as it arrives
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateWriter {
    converter: TextureConverter,
}

impl ImmediateWriter {
    pub fn new(converter: TextureConverter) -> Self {
        Self { converter }
    }
}

impl TextureSink for ImmediateWriter {
    fn submit(&mut self, name: &str, image: RgbaImage, path: PathBuf) -> TextureResult<()> {
        debug!(texture = name, path = %path.display(), "Writing texture");
        self.converter.write_image(&image, &path)
    }
}

/// Holds bitmaps until [`TextureSink::flush`]
#[derive(Debug, Default)]
pub struct BatchQueue {
    converter: TextureConverter,
    pending: Vec<(String, RgbaImage, PathBuf)>,
}

impl BatchQueue {
    pub fn new(converter: TextureConverter) -> Self {
        Self {
            converter,
            pending: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl TextureSink for BatchQueue {
    fn submit(&mut self, name: &str, image: RgbaImage, path: PathBuf) -> TextureResult<()> {
        self.pending.push((name.to_string(), image, path));
        Ok(())
    }

    fn flush(&mut self) -> Vec<(String, TextureError)> {
        debug!(count = self.pending.len(), "Flushing texture queue");

        let mut failed = Vec::new();
        for (name, image, path) in self.pending.drain(..) {
            if let Err(e) = self.converter.write_image(&image, &path) {
                warn!(texture = %name, error = %e, "Queued texture failed to encode");
                failed.push((name, e));
            }
        }
        failed
    }
}
