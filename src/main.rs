//! daeforge CLI
//!
//! Command-line interface for exporting scenes to COLLADA, inspecting scene
//! files and decoding raw texture dumps.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use daeforge_core::logging::{init_with_config, TracingConfig};
use daeforge_export::materials::is_exportable_texture;
use daeforge_export::textures::TextureConverter;
use daeforge_export::{ExportOptions, Exporter, ImageFormat, UpAxis};
use daeforge_scene::{load_scene, Scene, Texture, TextureFormat};

/// daeforge - export scenes to COLLADA documents
#[derive(Parser)]
#[command(name = "daeforge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for structured data
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export a JSON scene to a COLLADA document
    Export(ExportArgs),

    /// Show what a scene contains and which textures would be exported
    Inspect(InspectArgs),

    /// Decode a raw texture dump to an image file
    Decode(DecodeArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Scene description (JSON)
    scene: PathBuf,

    /// Output document path
    #[arg(short, long)]
    output: PathBuf,

    /// Load export options from a JSON file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Up axis: x, y or z
    #[arg(long)]
    up_axis: Option<String>,

    /// Texture file format: png, tga or bmp
    #[arg(long)]
    image_format: Option<String>,

    /// Texture sub-folder relative to the output document
    #[arg(long)]
    image_folder: Option<PathBuf>,

    /// Do not write texture files
    #[arg(long)]
    no_textures: bool,

    /// Encode textures after the document is written
    #[arg(long)]
    batch_textures: bool,

    /// Only write bones referenced by skin data
    #[arg(long)]
    rigged_only: bool,

    /// Write vertex color channels
    #[arg(long)]
    vertex_colors: bool,

    /// Keep texture coordinates as stored
    #[arg(long)]
    no_fix_tex_coords: bool,

    /// Ignore per-material UV transforms
    #[arg(long)]
    no_uv_transforms: bool,

    /// Keep skin influences with a zero weight
    #[arg(long)]
    keep_zero_weights: bool,

    /// Ignore texture channel remapping
    #[arg(long)]
    raw_channels: bool,

    /// Fixed RFC 3339 timestamp for the asset header
    #[arg(long)]
    timestamp: Option<String>,
}

#[derive(Args)]
struct InspectArgs {
    /// Scene description (JSON)
    scene: PathBuf,
}

#[derive(Args)]
struct DecodeArgs {
    /// Raw texture data
    input: PathBuf,

    /// Pixel format: a8, rgba8, bgra8, bc1..bc5, rgba16f
    #[arg(long, default_value = "a8")]
    pixel_format: String,

    /// Width in pixels
    #[arg(long)]
    width: u32,

    /// Height in pixels
    #[arg(long)]
    height: u32,

    /// Output image; the format follows the extension
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_with_config(TracingConfig::from_verbosity(cli.verbose));

    match cli.command {
        Commands::Export(args) => cmd_export(args),
        Commands::Inspect(args) => cmd_inspect(args, cli.format),
        Commands::Decode(args) => cmd_decode(args),
    }
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let mut options = match &args.config {
        Some(path) => ExportOptions::from_json_file(path)
            .with_context(|| format!("Failed to load options from {:?}", path))?,
        None => ExportOptions::default(),
    };
    apply_overrides(&mut options, &args)?;
    debug!(?options, "Export options");

    let scene = load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {:?}", args.scene))?;

    let exporter = Exporter::new(options).with_progress(Box::new(|progress| {
        debug!(task = %progress.task, percent = progress.percent, "Progress");
    }));
    let report = exporter
        .export(&scene, &args.output)
        .with_context(|| format!("Failed to export {:?}", args.output))?;

    println!("Export complete: {:?}", report.document);
    println!("  Geometries: {}", report.geometry_count);
    println!("  Joints:     {}", report.joint_count);
    println!("  Textures:   {}", report.written_textures.len());

    if report.has_warnings() {
        println!("\nFinished with warnings, textures that failed:");
        for (name, error) in &report.failed_textures {
            println!("  {}: {}", name, error);
        }
    }

    Ok(())
}

fn apply_overrides(options: &mut ExportOptions, args: &ExportArgs) -> Result<()> {
    if let Some(axis) = &args.up_axis {
        options.up_axis = match axis.to_lowercase().as_str() {
            "x" | "x_up" => UpAxis::XUp,
            "y" | "y_up" => UpAxis::YUp,
            "z" | "z_up" => UpAxis::ZUp,
            _ => bail!("Unknown up axis: {}", axis),
        };
    }
    if let Some(format) = &args.image_format {
        options.image_format = match format.to_lowercase().as_str() {
            "png" => ImageFormat::Png,
            "tga" => ImageFormat::Tga,
            "bmp" => ImageFormat::Bmp,
            _ => bail!("Unknown image format: {}", format),
        };
    }
    if let Some(folder) = &args.image_folder {
        options.image_folder = folder.clone();
    }
    if let Some(timestamp) = &args.timestamp {
        options.timestamp = Some(timestamp.clone());
    }

    if args.no_textures {
        options.export_textures = false;
    }
    if args.batch_textures {
        options.batch_textures = true;
    }
    if args.rigged_only {
        options.only_export_rigged_bones = true;
    }
    if args.vertex_colors {
        options.use_vertex_colors = true;
    }
    if args.no_fix_tex_coords {
        options.fix_tex_coords = false;
    }
    if args.no_uv_transforms {
        options.apply_uv_transforms = false;
    }
    if args.keep_zero_weights {
        options.optimize_zero_weights = false;
    }
    if args.raw_channels {
        options.use_texture_channel_components = false;
    }

    options.validate().context("Invalid export options")?;
    Ok(())
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> Result<()> {
    let scene = load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {:?}", args.scene))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&inspect_json(&scene))?);
        }
        OutputFormat::Text => {
            println!("Scene: {:?}", args.scene);
            println!("  Meshes:    {}", scene.meshes.len());
            println!("  Materials: {}", scene.materials.len());
            println!("  Bones:     {}", scene.bone_count());
            println!("  Textures:  {}", scene.textures.len());

            if !scene.meshes.is_empty() {
                println!("\nMeshes:");
                for mesh in &scene.meshes {
                    let marker = if mesh.is_skinned() { " (skinned)" } else { "" };
                    println!(
                        "  {:<24} {:>8} vertices {:>8} indices{}",
                        mesh.name,
                        mesh.vertex_count(),
                        mesh.index_count(),
                        marker
                    );
                    if let Some((min, max)) = mesh.bounds() {
                        println!("    bounds {:?} .. {:?}", min, max);
                    }
                }
            }

            if !scene.textures.is_empty() {
                println!("\nTextures:");
                for texture in &scene.textures {
                    let verdict = if is_exportable_texture(&texture.name) {
                        "export"
                    } else {
                        "filtered"
                    };
                    println!(
                        "  {:<32} {:>5}x{:<5} {:?} [{}]",
                        texture.name, texture.width, texture.height, texture.format, verdict
                    );
                }
            }
        }
    }

    Ok(())
}

fn inspect_json(scene: &Scene) -> serde_json::Value {
    let meshes: Vec<_> = scene
        .meshes
        .iter()
        .map(|mesh| {
            serde_json::json!({
                "name": mesh.name,
                "vertices": mesh.vertex_count(),
                "indices": mesh.index_count(),
                "skinned": mesh.is_skinned(),
            })
        })
        .collect();
    let textures: Vec<_> = scene
        .textures
        .iter()
        .map(|texture| {
            serde_json::json!({
                "name": texture.name,
                "width": texture.width,
                "height": texture.height,
                "format": texture.format,
                "exported": is_exportable_texture(&texture.name),
            })
        })
        .collect();

    serde_json::json!({
        "meshes": meshes,
        "materials": scene.materials.iter().map(|m| &m.name).collect::<Vec<_>>(),
        "bones": scene.bone_count(),
        "textures": textures,
    })
}

fn cmd_decode(args: DecodeArgs) -> Result<()> {
    let format = parse_pixel_format(&args.pixel_format)?;
    let data = fs::read(&args.input).with_context(|| format!("Failed to read {:?}", args.input))?;

    let name = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("texture");
    let texture = Texture::new(name, format, args.width, args.height, data);

    let converter = TextureConverter::default();
    let image = converter
        .to_image(&texture)
        .with_context(|| format!("Failed to decode {:?}", args.input))?;
    converter
        .write_image(&image, &args.output)
        .with_context(|| format!("Failed to write {:?}", args.output))?;

    info!(output = %args.output.display(), "Decoded texture");
    println!("Decoded {}x{} {:?} to {:?}", args.width, args.height, format, args.output);
    Ok(())
}

fn parse_pixel_format(s: &str) -> Result<TextureFormat> {
    let format = match s.to_lowercase().as_str() {
        "a8" => TextureFormat::A8,
        "rgba8" => TextureFormat::Rgba8,
        "bgra8" => TextureFormat::Bgra8,
        "bc1" | "dxt1" => TextureFormat::Bc1,
        "bc2" | "dxt3" => TextureFormat::Bc2,
        "bc3" | "dxt5" => TextureFormat::Bc3,
        "bc4" => TextureFormat::Bc4,
        "bc5" => TextureFormat::Bc5,
        "rgba16f" => TextureFormat::Rgba16Float,
        _ => bail!("Unknown pixel format: {}", s),
    };
    Ok(format)
}
