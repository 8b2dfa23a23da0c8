//! Import diagnostics: statistics, dangling references, skip counts.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Aggregate counts over a level's roads and materials.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelStats {
    pub total_roads: usize,
    pub total_materials: usize,
    /// Distinct material names referenced by at least one road.
    pub unique_materials_used: usize,
    /// Roads per referenced material name.
    pub material_usage: BTreeMap<String, usize>,
}

/// A material referenced by roads but missing from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceWarning {
    pub material: String,
    pub road_ids: Vec<String>,
}

impl std::fmt::Display for ReferenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "material {} not found (used by {} road(s))",
            self.material,
            self.road_ids.len()
        )
    }
}

/// What the producers skipped while reading the level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub road_files_scanned: usize,
    pub road_files_failed: usize,
    pub road_records_rejected: usize,
    pub road_lines_unparsable: usize,
    pub duplicate_roads: usize,
    pub material_files_scanned: usize,
    pub material_files_failed: usize,
    pub material_records_rejected: usize,
    pub duplicate_materials: usize,
    /// Why terrain decoding failed, for lenient imports.
    pub terrain_error: Option<String>,
}

/// Everything a caller needs to judge whether a partial import is acceptable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub stats: LevelStats,
    pub missing_materials: BTreeSet<String>,
    pub reference_warnings: Vec<ReferenceWarning>,
    pub report: ImportReport,
    pub terrain_loaded: bool,
    /// The layer grid was zero-filled past a truncated payload.
    pub layers_partial: bool,
}

impl Diagnostics {
    /// True when nothing was skipped, missing, or recovered.
    pub fn is_clean(&self) -> bool {
        let r = &self.report;
        self.terrain_loaded
            && !self.layers_partial
            && self.missing_materials.is_empty()
            && r.road_files_failed == 0
            && r.road_records_rejected == 0
            && r.material_files_failed == 0
            && r.material_records_rejected == 0
    }
}
