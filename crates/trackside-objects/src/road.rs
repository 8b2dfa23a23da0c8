//! DecalRoad records.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use trackside_core::constants::{
    DEFAULT_BREAK_ANGLE, DEFAULT_DISTANCE_FADE, DEFAULT_IMPROVED_SPLINE, DEFAULT_RENDER_PRIORITY,
    DEFAULT_START_END_FADE, DEFAULT_TEXTURE_LENGTH, MIN_ROAD_NODES, ROAD_CLASS,
};
use trackside_core::types::{vec3_from_array, ControlPoint};
use trackside_core::ValidationError;

/// A placed road: an ordered run of weighted control points and a material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Road {
    /// Stable identifier, unique within a level.
    pub id: String,
    /// Scene-tree path of the owning group.
    pub parent_path: String,
    pub position_hint: DVec3,
    /// At least two points.
    pub control_points: Vec<ControlPoint>,
    /// Never empty.
    pub material_name: String,
    pub texture_length: f64,
    pub break_angle: f64,
    pub improved_spline: bool,
    pub render_priority: i32,
    pub start_end_fade: (f64, f64),
    pub distance_fade: (f64, f64),
}

impl Road {
    /// Total length of the control polyline, in meters.
    pub fn polyline_length(&self) -> f64 {
        self.control_points
            .windows(2)
            .map(|pair| pair[0].distance_to(&pair[1]))
            .sum()
    }

    pub fn node_count(&self) -> usize {
        self.control_points.len()
    }
}

fn default_texture_length() -> f64 {
    DEFAULT_TEXTURE_LENGTH
}

fn default_break_angle() -> f64 {
    DEFAULT_BREAK_ANGLE
}

fn default_improved_spline() -> bool {
    DEFAULT_IMPROVED_SPLINE
}

fn default_render_priority() -> i32 {
    DEFAULT_RENDER_PRIORITY
}

fn default_start_end_fade() -> [f64; 2] {
    DEFAULT_START_END_FADE
}

fn default_distance_fade() -> [f64; 2] {
    DEFAULT_DISTANCE_FADE
}

/// A DecalRoad entry as it appears on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadRecord {
    pub class: String,
    #[serde(default)]
    pub persistent_id: String,
    #[serde(default, rename = "__parent")]
    pub parent: String,
    #[serde(default)]
    pub position: Option<Vec<f64>>,
    #[serde(default)]
    pub nodes: Vec<Vec<f64>>,
    #[serde(default)]
    pub material: String,
    #[serde(default = "default_texture_length")]
    pub texture_length: f64,
    #[serde(default = "default_break_angle")]
    pub break_angle: f64,
    #[serde(default = "default_improved_spline")]
    pub improved_spline: bool,
    #[serde(default = "default_render_priority")]
    pub render_priority: i32,
    #[serde(default = "default_start_end_fade")]
    pub start_end_fade: [f64; 2],
    #[serde(default = "default_distance_fade")]
    pub distance_fade: [f64; 2],
}

/// An object is a road candidate when it is a DecalRoad with at least two nodes.
pub fn is_road_candidate(value: &Value) -> bool {
    value.get("class").and_then(Value::as_str) == Some(ROAD_CLASS)
        && value
            .get("nodes")
            .and_then(Value::as_array)
            .is_some_and(|nodes| nodes.len() >= MIN_ROAD_NODES)
}

impl TryFrom<RoadRecord> for Road {
    type Error = ValidationError;

    fn try_from(record: RoadRecord) -> Result<Self, Self::Error> {
        let id = record.persistent_id;
        if record.nodes.len() < MIN_ROAD_NODES {
            return Err(ValidationError::TooFewNodes {
                id,
                count: record.nodes.len(),
            });
        }
        if record.material.trim().is_empty() {
            return Err(ValidationError::MissingMaterial { id });
        }

        let mut control_points = Vec::with_capacity(record.nodes.len());
        for (index, node) in record.nodes.iter().enumerate() {
            match ControlPoint::from_node(node) {
                Some(cp) => control_points.push(cp),
                None => return Err(ValidationError::MalformedNode { id, index }),
            }
        }

        let position_hint = record
            .position
            .as_deref()
            .and_then(vec3_from_array)
            .unwrap_or(DVec3::ZERO);

        Ok(Road {
            id,
            parent_path: record.parent,
            position_hint,
            control_points,
            material_name: record.material,
            texture_length: record.texture_length,
            break_angle: record.break_angle,
            improved_spline: record.improved_spline,
            render_priority: record.render_priority,
            start_end_fade: (record.start_end_fade[0], record.start_end_fade[1]),
            distance_fade: (record.distance_fade[0], record.distance_fade[1]),
        })
    }
}
