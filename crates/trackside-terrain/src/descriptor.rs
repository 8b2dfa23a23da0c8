//! Companion `.terrain.json` descriptor.

use std::path::Path;

use serde::{Deserialize, Serialize};
use trackside_core::constants::{HEIGHT_ITEM_SIZE, LAYER_ITEM_SIZE};
use trackside_core::{FormatError, LevelError};

fn default_layer_item_size() -> u32 {
    LAYER_ITEM_SIZE
}

fn overflow(what: &str, size: u32) -> FormatError {
    FormatError::Descriptor(format!("{what} overflows for size {size}"))
}

/// Declared shape of a terrain container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainDescriptor {
    pub version: u8,
    /// Grid side length in samples.
    pub size: u32,
    /// Number of height samples (size²).
    pub height_map_size: u64,
    /// Bytes per height sample.
    pub height_map_item_size: u32,
    /// Number of layer samples; 0 when the terrain has no layer map.
    #[serde(default)]
    pub layer_map_size: u64,
    #[serde(default = "default_layer_item_size")]
    pub layer_map_item_size: u32,
    /// Terrain material names, indexed by layer value.
    #[serde(default)]
    pub materials: Vec<String>,
    /// Container file name, when the descriptor records it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datafile: Option<String>,
}

impl TerrainDescriptor {
    /// Load and parse a descriptor file.
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path).map_err(|e| LevelError::io(path, e))?;
        serde_json::from_str(&json).map_err(|e| LevelError::json(path, e))
    }

    /// Samples per grid (size²).
    pub fn cell_count(&self) -> Result<usize, FormatError> {
        let side = self.size as usize;
        side.checked_mul(side)
            .ok_or_else(|| overflow("size²", self.size))
    }

    /// Height payload length in bytes.
    pub fn height_bytes(&self) -> Result<usize, FormatError> {
        self.cell_count()?
            .checked_mul(HEIGHT_ITEM_SIZE as usize)
            .ok_or_else(|| overflow("height payload length", self.size))
    }

    /// Declared layer payload length in bytes.
    pub fn layer_bytes(&self) -> Result<usize, FormatError> {
        if !self.has_layer_map() {
            return Ok(0);
        }
        self.cell_count()?
            .checked_mul(LAYER_ITEM_SIZE as usize)
            .ok_or_else(|| overflow("layer payload length", self.size))
    }

    pub fn has_layer_map(&self) -> bool {
        self.layer_map_size > 0
    }

    /// Check that the declared sizes describe a square grid this codec reads.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.size == 0 {
            return Err(FormatError::Descriptor("size must be at least 1".into()));
        }
        let cells = self.cell_count()? as u64;
        if self.height_map_size != cells {
            return Err(FormatError::Descriptor(format!(
                "heightMapSize {} does not match size² = {cells}",
                self.height_map_size
            )));
        }
        if self.height_map_item_size != HEIGHT_ITEM_SIZE {
            return Err(FormatError::Descriptor(format!(
                "unsupported heightMapItemSize {}",
                self.height_map_item_size
            )));
        }
        if self.has_layer_map() {
            if self.layer_map_size != cells {
                return Err(FormatError::Descriptor(format!(
                    "layerMapSize {} does not match size² = {cells}",
                    self.layer_map_size
                )));
            }
            if self.layer_map_item_size != LAYER_ITEM_SIZE {
                return Err(FormatError::Descriptor(format!(
                    "unsupported layerMapItemSize {}",
                    self.layer_map_item_size
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> TerrainDescriptor {
        serde_json::from_str(json).expect("descriptor should parse")
    }

    #[test]
    fn test_parse_full_descriptor() {
        let d = parse(
            r#"{"version":9,"size":2,"heightMapSize":4,"heightMapItemSize":2,
                "layerMapSize":4,"layerMapItemSize":1,"materials":["grass","asphalt"],
                "datafile":"levels/x/x.ter"}"#,
        );
        assert_eq!(d.version, 9);
        assert_eq!(d.height_bytes(), Ok(8));
        assert_eq!(d.layer_bytes(), Ok(4));
        assert_eq!(d.materials, vec!["grass", "asphalt"]);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_layer_map_optional() {
        let d = parse(r#"{"version":1,"size":3,"heightMapSize":9,"heightMapItemSize":2}"#);
        assert!(!d.has_layer_map());
        assert_eq!(d.layer_bytes(), Ok(0));
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inconsistent_sizes() {
        let d = parse(r#"{"version":1,"size":3,"heightMapSize":8,"heightMapItemSize":2}"#);
        assert!(matches!(d.validate(), Err(FormatError::Descriptor(_))));

        let d = parse(r#"{"version":1,"size":2,"heightMapSize":4,"heightMapItemSize":4}"#);
        assert!(d.validate().is_err());

        let d = parse(
            r#"{"version":1,"size":2,"heightMapSize":4,"heightMapItemSize":2,
                "layerMapSize":4,"layerMapItemSize":2}"#,
        );
        assert!(d.validate().is_err());

        let d = parse(r#"{"version":1,"size":0,"heightMapSize":0,"heightMapItemSize":2}"#);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_payload_length_overflow_is_descriptor_error() {
        let side = u32::MAX as u64;
        let d = TerrainDescriptor {
            version: 1,
            size: u32::MAX,
            height_map_size: side * side,
            height_map_item_size: 2,
            layer_map_size: side * side,
            layer_map_item_size: 1,
            materials: Vec::new(),
            datafile: None,
        };
        assert!(matches!(d.height_bytes(), Err(FormatError::Descriptor(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("trackside_missing.terrain.json");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            TerrainDescriptor::load(&path),
            Err(LevelError::Io { .. })
        ));
    }
}
