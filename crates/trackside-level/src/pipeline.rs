//! Level import pipeline.
//!
//! The four producers share no data, so they run in parallel and meet
//! once, in `assemble`. Only the terrain read is allowed to fail the
//! import, and only in strict mode.

use std::path::{Path, PathBuf};

use log::{info, warn};
use trackside_core::constants::{LEVEL_ROOT_MARKERS, LEVEL_ROOT_SEARCH_DEPTH, TERRAIN_EXTENSION};
use trackside_core::discovery::has_extension;
use trackside_core::{ImportOptions, LevelError};
use trackside_objects::{catalog, scanner, CatalogBuild, RoadScan};
use trackside_terrain::{load_terrain, locate_terrain, preset, Terrain, TerrainPreset};

use crate::diagnostics::ImportReport;
use crate::model::{assemble_with_report, LevelModel};

struct Gathered {
    terrain: Result<Terrain, LevelError>,
    preset: TerrainPreset,
    roads: RoadScan,
    materials: CatalogBuild,
}

fn load_level_terrain(directory: &Path, options: &ImportOptions) -> Result<Terrain, LevelError> {
    let source = locate_terrain(directory, &options.terrain_descriptor_patterns)
        .ok_or_else(|| LevelError::TerrainNotFound(directory.to_path_buf()))?;
    load_terrain(&source, options.terrain_format)
}

fn gather(directory: &Path, options: &ImportOptions) -> Gathered {
    let ((terrain, preset), (roads, materials)) = rayon::join(
        || {
            rayon::join(
                || load_level_terrain(directory, options),
                || preset::resolve(directory, &options.preset_patterns),
            )
        },
        || {
            rayon::join(
                || scanner::scan_report(directory, &options.road_patterns),
                || catalog::build_report(directory, &options.material_patterns),
            )
        },
    );
    Gathered {
        terrain,
        preset,
        roads,
        materials,
    }
}

fn finish(
    terrain: Option<Terrain>,
    terrain_error: Option<String>,
    preset: TerrainPreset,
    roads: RoadScan,
    materials: CatalogBuild,
) -> LevelModel {
    let report = ImportReport {
        road_files_scanned: roads.files_scanned,
        road_files_failed: roads.files_failed,
        road_records_rejected: roads.records_rejected,
        road_lines_unparsable: roads.unparsable_lines,
        duplicate_roads: roads.duplicates_dropped,
        material_files_scanned: materials.files_scanned,
        material_files_failed: materials.files_failed,
        material_records_rejected: materials.records_rejected,
        duplicate_materials: materials.duplicates_dropped,
        terrain_error,
    };
    let model = assemble_with_report(terrain, preset, roads.roads, materials.catalog, report);
    let stats = model.stats();
    info!(
        "Level assembled: {} road(s), {} material(s), {} missing",
        stats.total_roads,
        stats.total_materials,
        model.missing_materials().len()
    );
    model
}

/// Parse a level with default options. Fails only if the terrain
/// cannot be located, read, or decoded.
pub fn parse(directory: &Path) -> Result<LevelModel, LevelError> {
    parse_with(directory, &ImportOptions::default())
}

/// Parse a level, failing only on terrain errors.
pub fn parse_with(directory: &Path, options: &ImportOptions) -> Result<LevelModel, LevelError> {
    let gathered = gather(directory, options);
    let terrain = gathered.terrain?;
    Ok(finish(
        Some(terrain),
        None,
        gathered.preset,
        gathered.roads,
        gathered.materials,
    ))
}

/// Parse a level, recording a terrain failure in the diagnostics
/// instead of returning it.
pub fn parse_lenient(directory: &Path, options: &ImportOptions) -> LevelModel {
    let gathered = gather(directory, options);
    let (terrain, terrain_error) = match gathered.terrain {
        Ok(terrain) => (Some(terrain), None),
        Err(e) => {
            warn!("Terrain unavailable: {e}");
            (None, Some(e.to_string()))
        }
    };
    finish(
        terrain,
        terrain_error,
        gathered.preset,
        gathered.roads,
        gathered.materials,
    )
}

impl LevelModel {
    /// See [`parse`].
    pub fn parse(directory: &Path) -> Result<Self, LevelError> {
        parse(directory)
    }

    /// See [`parse_lenient`].
    pub fn parse_lenient(directory: &Path, options: &ImportOptions) -> Self {
        parse_lenient(directory, options)
    }
}

fn is_level_root(dir: &Path) -> bool {
    if LEVEL_ROOT_MARKERS.iter().any(|m| dir.join(m).is_file()) {
        return true;
    }
    std::fs::read_dir(dir).is_ok_and(|entries| {
        entries
            .flatten()
            .any(|e| has_extension(&e.path(), TERRAIN_EXTENSION))
    })
}

/// Walk up from `path` (a file or directory) looking for a level root.
pub fn find_level_root(path: &Path) -> Option<PathBuf> {
    let mut dir = if path.is_file() { path.parent()? } else { path };
    for _ in 0..=LEVEL_ROOT_SEARCH_DEPTH {
        if is_level_root(dir) {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("trackside_pipeline_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_find_level_root_from_nested_file() {
        let dir = fixture_dir("root");
        fs::write(dir.join("info.json"), "{}").unwrap();
        let nested = dir.join("main/MissionGroup/roads");
        fs::create_dir_all(&nested).unwrap();
        let file = nested.join("items.level.json");
        fs::write(&file, "").unwrap();

        assert_eq!(find_level_root(&file), Some(dir.clone()));
        assert_eq!(find_level_root(&dir), Some(dir));
    }

    #[test]
    fn test_find_level_root_by_terrain_file() {
        let dir = fixture_dir("ter_root");
        fs::write(dir.join("island.TER"), [0u8]).unwrap();
        assert_eq!(find_level_root(&dir), Some(dir));
    }

    #[test]
    fn test_strict_parse_without_terrain_fails() {
        let dir = fixture_dir("no_terrain");
        assert!(matches!(parse(&dir), Err(LevelError::TerrainNotFound(_))));
    }

    #[test]
    fn test_lenient_parse_without_terrain() {
        let dir = fixture_dir("lenient");
        let model = parse_lenient(&dir, &ImportOptions::default());
        assert!(model.terrain().is_none());
        assert!(model.report().terrain_error.is_some());
        assert_eq!(model.preset().height_scale, 200.0);
    }
}
