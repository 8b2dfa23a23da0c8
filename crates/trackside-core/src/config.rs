//! Import options shared by every producer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MATERIAL_PATTERNS, DEFAULT_PRESET_PATTERNS, DEFAULT_ROAD_PATTERNS,
    DEFAULT_TERRAIN_DESCRIPTOR_PATTERNS,
};
use crate::enums::TerrainFormatHint;
use crate::error::LevelError;

/// Glob patterns and format hints for a level import.
///
/// Patterns are matched case-insensitively against paths relative to the
/// level directory, with `/` as separator. Every field has a default, so a
/// partial JSON file overrides only what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImportOptions {
    pub road_patterns: Vec<String>,
    pub material_patterns: Vec<String>,
    pub preset_patterns: Vec<String>,
    pub terrain_descriptor_patterns: Vec<String>,
    pub terrain_format: TerrainFormatHint,
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            road_patterns: owned(DEFAULT_ROAD_PATTERNS),
            material_patterns: owned(DEFAULT_MATERIAL_PATTERNS),
            preset_patterns: owned(DEFAULT_PRESET_PATTERNS),
            terrain_descriptor_patterns: owned(DEFAULT_TERRAIN_DESCRIPTOR_PATTERNS),
            terrain_format: TerrainFormatHint::Auto,
        }
    }
}

impl ImportOptions {
    /// Load options from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path).map_err(|e| LevelError::io(path, e))?;
        serde_json::from_str(&json).map_err(|e| LevelError::json(path, e))
    }

    pub fn with_terrain_format(mut self, hint: TerrainFormatHint) -> Self {
        self.terrain_format = hint;
        self
    }
}
