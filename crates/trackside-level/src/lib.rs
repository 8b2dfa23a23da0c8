//! Level assembly for trackside.
//!
//! Runs the terrain, preset, road, and material producers over a level
//! directory and joins them into one cross-validated [`LevelModel`].

pub use trackside_core as core;
pub use trackside_objects as objects;
pub use trackside_terrain as terrain;

pub mod diagnostics;
pub mod model;
pub mod pipeline;

// Re-export key types for convenience.
pub use diagnostics::{Diagnostics, ImportReport, LevelStats, ReferenceWarning};
pub use model::{assemble, LevelModel};
pub use pipeline::{find_level_root, parse, parse_lenient, parse_with};
