//! Fundamental geometric types.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// One weighted road control point in level space (meters).
/// x = East, y = North, z = Up; `width` is the road width at this node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub width: f64,
}

impl ControlPoint {
    pub fn new(x: f64, y: f64, z: f64, width: f64) -> Self {
        Self { x, y, z, width }
    }

    /// Build from a `[x, y, z, width]` node. Returns None unless the slice
    /// holds exactly four finite numbers.
    pub fn from_node(node: &[f64]) -> Option<Self> {
        match *node {
            [x, y, z, width] if node.iter().all(|v| v.is_finite()) => {
                Some(Self::new(x, y, z, width))
            }
            _ => None,
        }
    }

    pub fn position(&self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    /// 3D distance to another control point, ignoring width.
    pub fn distance_to(&self, other: &ControlPoint) -> f64 {
        self.position().distance(other.position())
    }
}

/// Read a `[x, y, z]` JSON array into a vector.
pub fn vec3_from_array(values: &[f64]) -> Option<DVec3> {
    match *values {
        [x, y, z] => Some(DVec3::new(x, y, z)),
        _ => None,
    }
}
