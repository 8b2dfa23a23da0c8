//! Enumerations shared across crates.

use serde::{Deserialize, Serialize};

/// Physical layout of a terrain container payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainFormatVariant {
    /// Payload right after the 5-byte header, little-endian heights.
    Current,
    /// Payload at offset 2048, big-endian heights.
    Legacy,
}

impl TerrainFormatVariant {
    /// Byte offset of the height payload.
    pub fn payload_offset(self) -> usize {
        match self {
            TerrainFormatVariant::Current => crate::constants::CURRENT_PAYLOAD_OFFSET,
            TerrainFormatVariant::Legacy => crate::constants::LEGACY_PAYLOAD_OFFSET,
        }
    }

    pub fn read_height(self, bytes: [u8; 2]) -> u16 {
        match self {
            TerrainFormatVariant::Current => u16::from_le_bytes(bytes),
            TerrainFormatVariant::Legacy => u16::from_be_bytes(bytes),
        }
    }
}

impl std::fmt::Display for TerrainFormatVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TerrainFormatVariant::Current => "current",
            TerrainFormatVariant::Legacy => "legacy",
        };
        f.write_str(s)
    }
}

/// Caller's choice of terrain layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainFormatHint {
    /// Trial-decode the current layout, fall back to legacy.
    #[default]
    Auto,
    Current,
    Legacy,
}

impl TerrainFormatHint {
    /// The forced variant, if any.
    pub fn variant(self) -> Option<TerrainFormatVariant> {
        match self {
            TerrainFormatHint::Auto => None,
            TerrainFormatHint::Current => Some(TerrainFormatVariant::Current),
            TerrainFormatHint::Legacy => Some(TerrainFormatVariant::Legacy),
        }
    }
}
