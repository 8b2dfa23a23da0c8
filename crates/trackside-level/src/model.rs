//! LevelModel: the immutable, cross-validated result of a level import.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::{debug, warn};
use trackside_objects::{Material, MaterialCatalog, Road};
use trackside_terrain::{HeightGrid, LayerGrid, Terrain, TerrainPreset};

use crate::diagnostics::{Diagnostics, ImportReport, LevelStats, ReferenceWarning};

/// Terrain, preset, roads, and materials of one level.
///
/// Built once; every statistic is derived from the owned collections on
/// request, so nothing can go stale.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelModel {
    terrain: Option<Terrain>,
    preset: TerrainPreset,
    roads: Vec<Road>,
    materials: MaterialCatalog,
    report: ImportReport,
}

/// Join the producers' results. Always succeeds; roads sharing an id
/// are reduced to the first, and unresolved materials are only reported.
pub fn assemble(
    terrain: Option<Terrain>,
    preset: TerrainPreset,
    roads: Vec<Road>,
    materials: MaterialCatalog,
) -> LevelModel {
    assemble_with_report(terrain, preset, roads, materials, ImportReport::default())
}

pub(crate) fn assemble_with_report(
    terrain: Option<Terrain>,
    preset: TerrainPreset,
    roads: Vec<Road>,
    materials: MaterialCatalog,
    mut report: ImportReport,
) -> LevelModel {
    let mut seen = HashSet::new();
    let before = roads.len();
    let roads: Vec<Road> = roads
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect();
    if roads.len() < before {
        debug!("Assemble dropped {} duplicate road(s)", before - roads.len());
        report.duplicate_roads += before - roads.len();
    }

    let model = LevelModel {
        terrain,
        preset,
        roads,
        materials,
        report,
    };

    for warning in model.reference_warnings() {
        warn!("{warning}");
    }
    model
}

impl LevelModel {
    pub fn terrain(&self) -> Option<&Terrain> {
        self.terrain.as_ref()
    }

    pub fn heights(&self) -> Option<&HeightGrid> {
        self.terrain.as_ref().map(Terrain::heights)
    }

    pub fn layers(&self) -> Option<&LayerGrid> {
        self.terrain.as_ref().and_then(Terrain::layers)
    }

    pub fn preset(&self) -> &TerrainPreset {
        &self.preset
    }

    pub fn roads(&self) -> &[Road] {
        &self.roads
    }

    pub fn road(&self, id: &str) -> Option<&Road> {
        self.roads.iter().find(|r| r.id == id)
    }

    pub fn roads_by_material<'a>(&'a self, material: &'a str) -> impl Iterator<Item = &'a Road> {
        self.roads.iter().filter(move |r| r.material_name == material)
    }

    pub fn materials(&self) -> &MaterialCatalog {
        &self.materials
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// The material a road renders with, if the catalog has it.
    pub fn road_material(&self, road: &Road) -> Option<&Material> {
        self.materials.get(&road.material_name)
    }

    /// Distinct material names referenced by roads.
    pub fn referenced_materials(&self) -> BTreeSet<&str> {
        self.roads.iter().map(|r| r.material_name.as_str()).collect()
    }

    /// Referenced material names absent from the catalog.
    pub fn missing_materials(&self) -> BTreeSet<String> {
        self.referenced_materials()
            .into_iter()
            .filter(|name| !self.materials.contains(name))
            .map(str::to_string)
            .collect()
    }

    pub fn reference_warnings(&self) -> Vec<ReferenceWarning> {
        let mut dangling: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for road in &self.roads {
            if !self.materials.contains(&road.material_name) {
                dangling
                    .entry(road.material_name.as_str())
                    .or_default()
                    .push(road.id.clone());
            }
        }
        dangling
            .into_iter()
            .map(|(material, road_ids)| ReferenceWarning {
                material: material.to_string(),
                road_ids,
            })
            .collect()
    }

    pub fn stats(&self) -> LevelStats {
        let mut material_usage: BTreeMap<String, usize> = BTreeMap::new();
        for road in &self.roads {
            *material_usage.entry(road.material_name.clone()).or_default() += 1;
        }
        LevelStats {
            total_roads: self.roads.len(),
            total_materials: self.materials.len(),
            unique_materials_used: material_usage.len(),
            material_usage,
        }
    }

    pub fn report(&self) -> &ImportReport {
        &self.report
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            stats: self.stats(),
            missing_materials: self.missing_materials(),
            reference_warnings: self.reference_warnings(),
            report: self.report.clone(),
            terrain_loaded: self.terrain.is_some(),
            layers_partial: self.layers().is_some_and(LayerGrid::is_partial),
        }
    }
}
