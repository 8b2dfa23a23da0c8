//! Terrain file discovery and loading.

use std::path::{Path, PathBuf};

use log::{debug, info};
use trackside_core::constants::TERRAIN_EXTENSION;
use trackside_core::discovery::{discover_files, has_extension};
use trackside_core::enums::TerrainFormatHint;
use trackside_core::LevelError;

use crate::codec::{decode, DecodedTerrain};
use crate::descriptor::TerrainDescriptor;
use crate::grid::{HeightGrid, LayerGrid, LayerUsage};

const DESCRIPTOR_SUFFIX: &str = ".terrain.json";

/// A terrain container paired with its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainSource {
    pub container: PathBuf,
    pub descriptor: PathBuf,
}

/// A decoded terrain together with the descriptor it was read against.
#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    pub source: TerrainSource,
    pub descriptor: TerrainDescriptor,
    pub decoded: DecodedTerrain,
}

impl Terrain {
    pub fn heights(&self) -> &HeightGrid {
        &self.decoded.heights
    }

    pub fn layers(&self) -> Option<&LayerGrid> {
        self.decoded.layers.as_ref()
    }

    /// Terrain material names, indexed by layer value.
    pub fn material_names(&self) -> &[String] {
        &self.descriptor.materials
    }

    pub fn layer_usage(&self) -> Option<LayerUsage> {
        self.layers().map(|l| l.usage(&self.descriptor.materials))
    }
}

/// `small_island.terrain.json` → `small_island`.
fn descriptor_stem(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let cut = name.len().checked_sub(DESCRIPTOR_SUFFIX.len())?;
    name.get(cut..)?
        .eq_ignore_ascii_case(DESCRIPTOR_SUFFIX)
        .then(|| &name[..cut])
}

/// Candidate container paths for a descriptor, most specific first.
fn container_candidates(descriptor_path: &Path) -> Vec<PathBuf> {
    let dir = descriptor_path.parent().unwrap_or_else(|| Path::new("."));
    let mut candidates = Vec::new();

    // The recorded datafile is usually a level-rooted path; only its name
    // is trusted, resolved next to the descriptor.
    if let Ok(descriptor) = TerrainDescriptor::load(descriptor_path) {
        if let Some(name) = descriptor
            .datafile
            .as_deref()
            .and_then(|d| Path::new(d).file_name())
        {
            candidates.push(dir.join(name));
        }
    }

    if let Some(stem) = descriptor_stem(descriptor_path) {
        candidates.push(dir.join(format!("{stem}.{TERRAIN_EXTENSION}")));
    }

    if let Ok(entries) = std::fs::read_dir(dir) {
        let mut siblings: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && has_extension(p, TERRAIN_EXTENSION))
            .collect();
        siblings.sort();
        candidates.extend(siblings);
    }

    candidates
}

/// Find the first descriptor (in discovery order) with a readable container.
pub fn locate_terrain<S: AsRef<str>>(directory: &Path, patterns: &[S]) -> Option<TerrainSource> {
    for descriptor in discover_files(directory, patterns) {
        match container_candidates(&descriptor)
            .into_iter()
            .find(|c| c.is_file())
        {
            Some(container) => {
                debug!(
                    "Terrain source: {} + {}",
                    container.display(),
                    descriptor.display()
                );
                return Some(TerrainSource {
                    container,
                    descriptor,
                });
            }
            None => debug!("No container next to {}", descriptor.display()),
        }
    }
    None
}

/// Read and decode a terrain. Failure here is fatal to terrain decoding.
pub fn load_terrain(source: &TerrainSource, hint: TerrainFormatHint) -> Result<Terrain, LevelError> {
    let descriptor = TerrainDescriptor::load(&source.descriptor)?;
    let data =
        std::fs::read(&source.container).map_err(|e| LevelError::io(&source.container, e))?;
    let decoded = decode(&data, &descriptor, hint)?;

    info!(
        "Loaded terrain {}: {}×{} ({} layout), layers: {}",
        source.container.display(),
        descriptor.size,
        descriptor.size,
        decoded.variant,
        match &decoded.layers {
            Some(l) if l.is_partial() => "partial",
            Some(_) => "complete",
            None => "none",
        }
    );

    Ok(Terrain {
        source: source.clone(),
        descriptor,
        decoded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use trackside_core::constants::DEFAULT_TERRAIN_DESCRIPTOR_PATTERNS;

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("trackside_source_{name}"));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const DESCRIPTOR: &str = r#"{"version":1,"size":2,"heightMapSize":4,"heightMapItemSize":2,
        "layerMapSize":4,"layerMapItemSize":1,"materials":["grass","dirt"]}"#;

    fn container_bytes() -> Vec<u8> {
        let mut data = vec![1u8, 2, 0, 0, 0];
        for h in [10u16, 20, 30, 40] {
            data.extend_from_slice(&h.to_le_bytes());
        }
        data.extend_from_slice(&[0, 1, 1, 1]);
        data
    }

    #[test]
    fn test_descriptor_stem() {
        assert_eq!(
            descriptor_stem(Path::new("a/small_island.terrain.json")),
            Some("small_island")
        );
        assert_eq!(descriptor_stem(Path::new("x.Terrain.JSON")), Some("x"));
        assert_eq!(descriptor_stem(Path::new("info.json")), None);
    }

    #[test]
    fn test_locate_and_load_by_stem() {
        let dir = fixture_dir("stem");
        fs::write(dir.join("island.terrain.json"), DESCRIPTOR).unwrap();
        fs::write(dir.join("island.ter"), container_bytes()).unwrap();

        let source = locate_terrain(&dir, DEFAULT_TERRAIN_DESCRIPTOR_PATTERNS).unwrap();
        assert!(source.container.ends_with("island.ter"));

        let terrain = load_terrain(&source, TerrainFormatHint::Auto).unwrap();
        assert_eq!(terrain.heights().to_rows(), vec![vec![10, 20], vec![30, 40]]);
        let usage = terrain.layer_usage().unwrap();
        assert_eq!(usage.entries[1].material.as_deref(), Some("dirt"));
        assert_eq!(usage.entries[1].count, 3);
    }

    #[test]
    fn test_locate_by_datafile() {
        let dir = fixture_dir("datafile");
        let descriptor = DESCRIPTOR.replace(
            "\"materials\"",
            "\"datafile\":\"/levels/x/theTerrain.ter\",\"materials\"",
        );
        fs::write(dir.join("x.terrain.json"), descriptor).unwrap();
        fs::write(dir.join("theTerrain.ter"), container_bytes()).unwrap();

        let source = locate_terrain(&dir, DEFAULT_TERRAIN_DESCRIPTOR_PATTERNS).unwrap();
        assert!(source.container.ends_with("theTerrain.ter"));
    }

    #[test]
    fn test_locate_without_container() {
        let dir = fixture_dir("orphan");
        fs::write(dir.join("x.terrain.json"), DESCRIPTOR).unwrap();
        assert!(locate_terrain(&dir, DEFAULT_TERRAIN_DESCRIPTOR_PATTERNS).is_none());
    }

    #[test]
    fn test_load_missing_container_is_io_error() {
        let dir = fixture_dir("missing");
        fs::write(dir.join("x.terrain.json"), DESCRIPTOR).unwrap();
        let source = TerrainSource {
            container: dir.join("x.ter"),
            descriptor: dir.join("x.terrain.json"),
        };
        assert!(matches!(
            load_terrain(&source, TerrainFormatHint::Auto),
            Err(LevelError::Io { .. })
        ));
    }

    #[test]
    fn test_load_header_mismatch_is_format_error() {
        let dir = fixture_dir("mismatch");
        fs::write(dir.join("x.terrain.json"), DESCRIPTOR).unwrap();
        let mut data = container_bytes();
        data[0] = 9;
        fs::write(dir.join("x.ter"), data).unwrap();

        let source = locate_terrain(&dir, DEFAULT_TERRAIN_DESCRIPTOR_PATTERNS).unwrap();
        assert!(matches!(
            load_terrain(&source, TerrainFormatHint::Auto),
            Err(LevelError::Format(_))
        ));
    }
}
