//! XKT Convert CLI
//!
//! Convert glTF and GLB files into XKT models.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use xkt_convert::{
    convert_gltf, ConvertOptions, GltfImportOptions, Section, WriteOptions, XktModelConfig,
    XktReader,
};

#[derive(Parser)]
#[command(name = "xkt-convert")]
#[command(author, version, about = "Convert glTF models into tiled, quantized XKT files", long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a glTF (.gltf) or binary glTF (.glb) file to XKT
    Convert {
        /// Source glTF or GLB file
        #[arg(short, long)]
        source: PathBuf,

        /// Output XKT file path
        #[arg(short, long)]
        output: PathBuf,

        /// Model ID written into the metadata (defaults to the source file stem)
        #[arg(long)]
        model_id: Option<String>,

        /// Meta model JSON file to embed instead of the generated metadata
        #[arg(long)]
        metamodel: Option<PathBuf>,

        /// Smallest tile diagonal before the k-d tree stops splitting
        #[arg(long, default_value = "500")]
        min_tile_size: f64,

        /// Minimum face angle, in degrees, for an edge to be drawn
        #[arg(long, default_value = "10")]
        edge_threshold: f64,

        /// Skip material textures and UVs
        #[arg(long)]
        no_textures: bool,

        /// Skip vertex normals
        #[arg(long)]
        no_normals: bool,
    },
    /// Show the sections and element counts of an XKT file
    Info {
        /// Path to XKT file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            source,
            output,
            model_id,
            metamodel,
            min_tile_size,
            edge_threshold,
            no_textures,
            no_normals,
        } => {
            convert_file(
                &source,
                &output,
                model_id,
                metamodel.as_deref(),
                min_tile_size,
                edge_threshold,
                !no_textures,
                !no_normals,
            )?;
        }
        Commands::Info { input } => {
            show_xkt_info(&input)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn convert_file(
    source_path: &Path,
    output_path: &Path,
    model_id: Option<String>,
    metamodel_path: Option<&Path>,
    min_tile_size: f64,
    edge_threshold: f64,
    include_textures: bool,
    include_normals: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Reading {:?}...", source_path);
    let source = fs::read(source_path)?;

    let model_id = model_id.unwrap_or_else(|| {
        source_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "default".to_string())
    });

    let model_config = XktModelConfig::default()
        .with_model_id(model_id)
        .with_min_tile_size(min_tile_size)
        .with_edge_threshold(edge_threshold)
        .with_creating_application(concat!("xkt-convert v", env!("CARGO_PKG_VERSION")));

    let mut import = GltfImportOptions {
        include_textures,
        include_normals,
        ..Default::default()
    };
    if let Some(dir) = source_path.parent() {
        import = import.with_base_path(dir);
    }

    let mut write = WriteOptions::default();
    if let Some(path) = metamodel_path {
        println!("Reading meta model {:?}...", path);
        write = write.with_meta_model_json(fs::read_to_string(path)?);
    }

    let options = ConvertOptions::default()
        .with_model_config(model_config)
        .with_import_options(import)
        .with_write_options(write);

    println!("Converting with config:");
    println!("  - Min tile size: {}", min_tile_size);
    println!("  - Edge threshold: {}°", edge_threshold);
    println!("  - Textures: {}", include_textures);
    println!("  - Normals: {}", include_normals);

    let result = convert_gltf(&source, &options)?;
    let stats = &result.stats;

    println!(
        "  {} entities in {} tiles, {} meshes, {} geometries",
        stats.num_entities, stats.num_tiles, stats.num_meshes, stats.num_geometries
    );
    println!(
        "  {} triangles, {} vertices, {} normals, {} UVs",
        stats.num_triangles, stats.num_vertices, stats.num_normals, stats.num_uvs
    );
    println!(
        "  {} textures in {} texture sets",
        stats.num_textures, stats.num_texture_sets
    );
    println!(
        "  {} metaobjects, {} property sets",
        stats.num_meta_objects, stats.num_property_sets
    );
    if !result.report.texture_failures.is_empty() {
        println!(
            "  {} textures written without compressed data",
            result.report.texture_failures.len()
        );
    }

    fs::write(output_path, &result.xkt)?;
    println!(
        "Wrote {:?} ({} bytes, {:.2}x source size) in {} ms",
        output_path, stats.xkt_size, stats.compression_ratio, stats.conversion_time_ms
    );

    Ok(())
}

fn show_xkt_info(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading XKT file from {:?}...", path);
    let bytes = fs::read(path)?;
    let reader = XktReader::parse(&bytes)?;

    println!("\nXKT File Info:");
    println!("  Version: {}", reader.version());
    println!("  File size: {} bytes", bytes.len());
    println!("  Entities: {}", reader.num_entities()?);
    println!("  Tiles: {}", reader.num_tiles()?);
    println!("  Meshes: {}", reader.num_meshes()?);
    println!("  Geometries: {}", reader.num_geometries());
    println!(
        "  Textures: {}",
        reader.u16s(Section::EachTextureAttributes)?.len() / 9
    );

    let metadata = reader.json(Section::Metadata)?;
    if let Some(id) = metadata.get("id").and_then(|v| v.as_str()) {
        println!("  Model ID: {}", id);
    }
    if let Some(meta_objects) = metadata.get("metaObjects").and_then(|v| v.as_array()) {
        println!("  Metaobjects: {}", meta_objects.len());
    }

    println!("\nSections (inflated sizes):");
    for section in Section::ALL {
        println!("  {:<40} {:>12}", section.name(), reader.section(section).len());
    }

    Ok(())
}
