//! level-inspect: summarize a level directory or a single terrain container.
//!
//! Usage:
//!   level-inspect summary levels/small_island --lenient
//!   level-inspect terrain small_island.ter small_island.terrain.json --format legacy

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use trackside_core::enums::TerrainFormatHint;
use trackside_core::ImportOptions;
use trackside_level::{find_level_root, LevelModel};
use trackside_terrain::{decode, DecodedTerrain, TerrainDescriptor};

/// Terrain container layout to assume.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Try the current layout, fall back to legacy if it looks wrong.
    Auto,
    Current,
    Legacy,
}

impl From<Format> for TerrainFormatHint {
    fn from(format: Format) -> Self {
        match format {
            Format::Auto => TerrainFormatHint::Auto,
            Format::Current => TerrainFormatHint::Current,
            Format::Legacy => TerrainFormatHint::Legacy,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "level-inspect", version, about = "Inspect driving-sim level data")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a whole level and report what was found.
    Summary {
        /// Level directory, or any file inside one.
        path: PathBuf,

        /// JSON file overriding discovery patterns.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Overrides the config's terrain format.
        #[arg(long, value_enum)]
        format: Option<Format>,

        /// Keep going when the terrain cannot be decoded.
        #[arg(long, default_value_t = false)]
        lenient: bool,

        /// Print diagnostics as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Decode one terrain container against its descriptor.
    Terrain {
        container: PathBuf,
        descriptor: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Auto)]
        format: Format,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Summary {
            path,
            config,
            format,
            lenient,
            json,
        } => cmd_summary(&path, config.as_deref(), format, lenient, json),
        Command::Terrain {
            container,
            descriptor,
            format,
            json,
        } => cmd_terrain(&container, &descriptor, format, json),
    }
}

fn load_options(config: Option<&Path>, format: Option<Format>) -> Result<ImportOptions> {
    let mut options = match config {
        Some(path) => ImportOptions::from_json_file(path)
            .with_context(|| format!("reading options from {}", path.display()))?,
        None => ImportOptions::default(),
    };
    if let Some(format) = format {
        options = options.with_terrain_format(format.into());
    }
    Ok(options)
}

fn cmd_summary(
    path: &Path,
    config: Option<&Path>,
    format: Option<Format>,
    lenient: bool,
    json: bool,
) -> Result<()> {
    let options = load_options(config, format)?;
    let root = find_level_root(path).unwrap_or_else(|| path.to_path_buf());
    info!("Level root: {}", root.display());

    let model = if lenient {
        trackside_level::parse_lenient(&root, &options)
    } else {
        trackside_level::parse_with(&root, &options)
            .with_context(|| format!("importing level {}", root.display()))?
    };

    if json {
        let out = serde_json::to_string_pretty(&model.diagnostics())?;
        println!("{out}");
    } else {
        print_summary(&root, &model);
    }
    Ok(())
}

fn print_summary(root: &Path, model: &LevelModel) {
    let stats = model.stats();
    let report = model.report();
    eprintln!("Level: {}", root.display());

    match model.terrain() {
        Some(terrain) => {
            let heights = terrain.heights();
            let h = heights.stats();
            eprintln!(
                "  Terrain: {}×{} ({} layout), heights {}..{}, {} terrain material(s)",
                heights.size(),
                heights.size(),
                terrain.decoded.variant,
                h.min,
                h.max,
                terrain.material_names().len()
            );
            if let Some(layers) = terrain.layers() {
                if layers.is_partial() {
                    eprintln!(
                        "  Layers: partial, {} of {} rows recovered",
                        layers.recovered_rows(),
                        layers.size()
                    );
                }
            }
        }
        None => eprintln!(
            "  Terrain: unavailable ({})",
            report.terrain_error.as_deref().unwrap_or("not found")
        ),
    }

    let preset = model.preset();
    eprintln!("  Preset: heightScale {}", preset.height_scale);
    if let Some(pos) = preset.position {
        eprintln!("          position ({}, {}, {})", pos.x, pos.y, pos.z);
    }

    eprintln!(
        "  Roads: {} from {} file(s) ({} rejected, {} duplicate)",
        stats.total_roads,
        report.road_files_scanned,
        report.road_records_rejected,
        report.duplicate_roads
    );
    eprintln!(
        "  Materials: {} defined, {} used by roads",
        stats.total_materials, stats.unique_materials_used
    );
    for (material, count) in &stats.material_usage {
        eprintln!("    {material}: {count}");
    }
    for warning in model.reference_warnings() {
        eprintln!("  Warning: {warning}");
    }
}

fn cmd_terrain(container: &Path, descriptor: &Path, format: Format, json: bool) -> Result<()> {
    let desc = TerrainDescriptor::load(descriptor)
        .with_context(|| format!("loading descriptor {}", descriptor.display()))?;
    let data = std::fs::read(container)
        .with_context(|| format!("reading {}", container.display()))?;
    let terrain = decode(&data, &desc, format.into())
        .with_context(|| format!("decoding {}", container.display()))?;

    if json {
        let out = serde_json::json!({
            "header": terrain.header,
            "variant": terrain.variant,
            "heights": terrain.heights.stats(),
            "roughness": terrain.heights.roughness(),
            "layers": terrain.layers.as_ref().map(|l| l.usage(&desc.materials)),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_terrain(container, &desc, &terrain);
    }
    Ok(())
}

fn print_terrain(container: &Path, desc: &TerrainDescriptor, terrain: &DecodedTerrain) {
    let h = terrain.heights.stats();
    eprintln!("Terrain: {}", container.display());
    eprintln!(
        "  Header: version {}, size {} ({} layout)",
        terrain.header.format_version, terrain.header.grid_size, terrain.variant
    );
    eprintln!(
        "  Heights: min {}, max {}, mean {:.1}, median {:.1}, std {:.1}, {} distinct, {:.1}% zero",
        h.min, h.max, h.mean, h.median, h.std_dev, h.distinct_values, h.zero_percentage
    );
    eprintln!("  Roughness: {:.5}", terrain.heights.roughness());

    match &terrain.layers {
        Some(layers) => {
            let usage = layers.usage(&desc.materials);
            eprintln!(
                "  Layers: {} distinct, {} cell(s) with unknown index{}",
                usage.distinct_layers(),
                usage.unknown_cells(),
                if layers.is_partial() { ", partial" } else { "" }
            );
            for entry in &usage.entries {
                eprintln!(
                    "    [{}] {}: {} ({:.1}%)",
                    entry.index,
                    entry.material.as_deref().unwrap_or("?"),
                    entry.count,
                    entry.percentage
                );
            }
        }
        None => eprintln!("  Layers: none"),
    }
}
