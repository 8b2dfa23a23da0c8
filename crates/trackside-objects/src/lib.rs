//! Placed-object parsing for trackside.
//!
//! DecalRoad discovery and deduplication, and the material catalog
//! the roads reference.

pub use trackside_core as core;

pub mod catalog;
pub mod material;
pub mod road;
pub mod scanner;

// Re-export key types for convenience.
pub use catalog::{CatalogBuild, MaterialCatalog};
pub use material::{Material, StageData};
pub use road::Road;
pub use scanner::RoadScan;
