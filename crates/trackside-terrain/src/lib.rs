//! Terrain decoding for trackside.
//!
//! Binary heightmap/layer container decoding, descriptor parsing,
//! terrain preset resolution, and terrain file discovery.

pub use trackside_core as core;

pub mod codec;
pub mod descriptor;
pub mod grid;
pub mod preset;
pub mod source;

// Re-export key types for convenience.
pub use codec::{decode, DecodedTerrain};
pub use descriptor::TerrainDescriptor;
pub use grid::{HeightGrid, HeightStats, LayerGrid, LayerUsage, TerrainHeader};
pub use preset::TerrainPreset;
pub use source::{load_terrain, locate_terrain, Terrain, TerrainSource};
