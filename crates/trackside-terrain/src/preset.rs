//! Terrain preset resolution.
//!
//! The terrain descriptor carries no vertical scale or world placement.
//! Those live in an optional preset file next to the level data. Resolution
//! never fails: anything missing falls back to the defaults.

use std::path::Path;

use glam::DVec3;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trackside_core::constants::DEFAULT_HEIGHT_SCALE;
use trackside_core::discovery::discover_files;

/// Vertical scale and world placement of a terrain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainPreset {
    pub height_scale: f64,
    pub position: Option<DVec3>,
}

impl Default for TerrainPreset {
    fn default() -> Self {
        Self {
            height_scale: DEFAULT_HEIGHT_SCALE,
            position: None,
        }
    }
}

impl TerrainPreset {
    /// Read the keys this crate understands from a parsed preset.
    ///
    /// `heightScale` must be a finite positive number; `pos` must be an
    /// object with numeric `x`, `y`, `z` (or a three-element array).
    pub fn from_json(value: &Value) -> Self {
        let height_scale = value
            .get("heightScale")
            .and_then(Value::as_f64)
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_HEIGHT_SCALE);

        let position = value.get("pos").and_then(parse_position);

        Self {
            height_scale,
            position,
        }
    }
}

fn parse_position(value: &Value) -> Option<DVec3> {
    match value {
        Value::Object(map) => {
            let x = map.get("x")?.as_f64()?;
            let y = map.get("y")?.as_f64()?;
            let z = map.get("z")?.as_f64()?;
            Some(DVec3::new(x, y, z))
        }
        Value::Array(items) => match items.as_slice() {
            [x, y, z] => Some(DVec3::new(x.as_f64()?, y.as_f64()?, z.as_f64()?)),
            _ => None,
        },
        _ => None,
    }
}

/// Resolve the preset for a level directory.
///
/// When several files match, the lexicographically first path wins.
pub fn resolve<S: AsRef<str>>(directory: &Path, patterns: &[S]) -> TerrainPreset {
    let mut candidates = discover_files(directory, patterns);
    candidates.sort();

    let Some(path) = candidates.first() else {
        debug!("No terrain preset under {}; using defaults", directory.display());
        return TerrainPreset::default();
    };
    if candidates.len() > 1 {
        debug!(
            "{} preset candidates; using {}",
            candidates.len(),
            path.display()
        );
    }

    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            warn!("Cannot read terrain preset {}: {e}", path.display());
            return TerrainPreset::default();
        }
    };
    match serde_json::from_str::<Value>(&json) {
        Ok(value) => TerrainPreset::from_json(&value),
        Err(e) => {
            warn!("Invalid terrain preset {}: {e}", path.display());
            TerrainPreset::default()
        }
    }
}
