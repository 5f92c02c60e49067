//! daeforge-export
//!
//! Writes a [`Scene`](daeforge_scene::Scene) as a COLLADA 1.4 document:
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | per-channel vertex attribute buffers |
//! | [`topology`] | triangle strip to list conversion |
//! | [`skin`] | vertex influence remapping |
//! | [`materials`] | material dedup and texture map filtering |
//! | [`uv`] | UV transforms and texture space flip |
//! | [`collada`] | the document writer |
//! | [`exporter`] | drives a complete export |
//! | [`textures`] | texture decoding and image file output |
//!
//! # Example
//!
//! ```rust,ignore
//! use daeforge_export::{Exporter, ExportOptions};
//!
//! let scene = daeforge_scene::load_scene("character.json")?;
//! let report = Exporter::new(ExportOptions::default()).export(&scene, "character.dae")?;
//! for (name, error) in &report.failed_textures {
//!     eprintln!("{name}: {error}");
//! }
//! ```

pub mod collada;
pub mod error;
pub mod exporter;
pub mod geometry;
pub mod materials;
pub mod names;
pub mod options;
pub mod progress;
pub mod skin;
pub mod textures;
pub mod topology;
pub mod uv;

pub use collada::{DocumentWriter, WriterState};
pub use error::{ExportError, ExportResult};
pub use exporter::{export_scene, ExportReport, Exporter};
pub use options::{ExportOptions, UpAxis};
pub use progress::{ExportProgress, ProgressCallback};
pub use textures::{ImageFormat, TextureConverter, TextureError, TextureSink};
