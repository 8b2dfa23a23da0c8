//! Name-indexed material catalog built from `*.materials.json` files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::prelude::*;
use serde_json::Value;
use trackside_core::constants::MATERIAL_CLASS;
use trackside_core::discovery::discover_files;
use trackside_core::{LevelError, ValidationError};

use crate::material::{Material, MaterialRecord};

/// Materials keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialCatalog {
    materials: BTreeMap<String, Material>,
}

impl MaterialCatalog {
    /// Build from materials in priority order; the first of each name wins.
    pub fn from_materials(materials: impl IntoIterator<Item = Material>) -> Self {
        let mut catalog = Self::default();
        for material in materials {
            catalog.insert_first(material);
        }
        catalog
    }

    /// Returns false if the name was already taken.
    fn insert_first(&mut self, material: Material) -> bool {
        if self.materials.contains_key(&material.name) {
            return false;
        }
        self.materials.insert(material.name.clone(), material);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    pub fn as_map(&self) -> &BTreeMap<String, Material> {
        &self.materials
    }
}

/// Materials parsed from one file.
#[derive(Debug, Clone, Default)]
pub struct FileMaterials {
    pub materials: Vec<Material>,
    pub rejected: usize,
}

/// Catalog plus bookkeeping for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogBuild {
    pub catalog: MaterialCatalog,
    pub files_scanned: usize,
    pub files_failed: usize,
    pub records_rejected: usize,
    pub duplicates_dropped: usize,
}

/// Build the catalog for a level directory.
pub fn build<S: AsRef<str>>(directory: &Path, patterns: &[S]) -> MaterialCatalog {
    build_report(directory, patterns).catalog
}

/// Like [`build`], keeping the counts of what was skipped.
pub fn build_report<S: AsRef<str>>(directory: &Path, patterns: &[S]) -> CatalogBuild {
    let files = discover_files(directory, patterns);
    debug!("{} material file(s) under {}", files.len(), directory.display());

    let parsed: Vec<(PathBuf, Result<FileMaterials, LevelError>)> = files
        .into_par_iter()
        .map(|path| {
            let result = parse_material_file(&path);
            (path, result)
        })
        .collect();

    let mut build = CatalogBuild::default();
    for (path, result) in parsed {
        let file = match result {
            Ok(file) => file,
            Err(e) => {
                warn!("Skipping material file {}: {e}", path.display());
                build.files_failed += 1;
                continue;
            }
        };
        build.files_scanned += 1;
        build.records_rejected += file.rejected;

        for material in file.materials {
            let name = material.name.clone();
            if !build.catalog.insert_first(material) {
                debug!("Material {name} already defined; ignoring {}", path.display());
                build.duplicates_dropped += 1;
            }
        }
    }

    info!(
        "Found {} material(s) in {} file(s); {} rejected",
        build.catalog.len(),
        build.files_scanned,
        build.records_rejected
    );
    build
}

pub fn parse_material_file(path: &Path) -> Result<FileMaterials, LevelError> {
    let text = std::fs::read_to_string(path).map_err(|e| LevelError::io(path, e))?;
    parse_material_text(&text).map_err(|e| LevelError::json(path, e))
}

/// Parse a material file: a JSON object whose `class == "Material"`
/// entries are materials named by their key.
pub fn parse_material_text(text: &str) -> Result<FileMaterials, serde_json::Error> {
    let root: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))?;
    let mut file = FileMaterials::default();

    let Value::Object(entries) = root else {
        debug!("Material file is not a JSON object; ignoring");
        return Ok(file);
    };

    for (name, entry) in entries {
        if entry.get("class").and_then(Value::as_str) != Some(MATERIAL_CLASS) {
            continue;
        }
        match build_material(&name, entry) {
            Ok(material) => file.materials.push(material),
            Err(e) => {
                warn!("Skipping material {name}: {e}");
                file.rejected += 1;
            }
        }
    }
    Ok(file)
}

fn build_material(name: &str, entry: Value) -> Result<Material, ValidationError> {
    let record: MaterialRecord =
        serde_json::from_value(entry).map_err(|e| ValidationError::MalformedRecord {
            kind: "Material",
            reason: e.to_string(),
        })?;
    Material::from_record(name, record)
}
