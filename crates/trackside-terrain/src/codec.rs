//! Terrain container decoder.
//!
//! Layout, current revision:
//!   [0]      u8      format version
//!   [1..5]   u32 LE  grid size
//!   [5..]    u16 LE  heights, size² samples, row-major
//!   then     u8      layer indices, size² samples, row-major (optional)
//!
//! The legacy revision keeps the same header but starts the payload at
//! byte 2048 and stores heights big-endian. Nothing in the file says which
//! revision wrote it, so `TerrainFormatHint::Auto` trial-decodes both.

use log::{debug, info, warn};
use trackside_core::constants::{
    CURRENT_PAYLOAD_OFFSET, HEIGHT_ITEM_SIZE, LEGACY_PAYLOAD_OFFSET, MAX_PLAUSIBLE_ROUGHNESS,
};
use trackside_core::enums::{TerrainFormatHint, TerrainFormatVariant};
use trackside_core::FormatError;

use crate::descriptor::TerrainDescriptor;
use crate::grid::{HeightGrid, LayerGrid, TerrainHeader};

/// Output of a successful decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTerrain {
    pub header: TerrainHeader,
    /// Layout the payload was read with.
    pub variant: TerrainFormatVariant,
    pub heights: HeightGrid,
    /// None when the container carries no layer bytes.
    pub layers: Option<LayerGrid>,
}

/// Decode a terrain container against its descriptor.
pub fn decode(
    data: &[u8],
    descriptor: &TerrainDescriptor,
    hint: TerrainFormatHint,
) -> Result<DecodedTerrain, FormatError> {
    descriptor.validate()?;
    let header = TerrainHeader::parse(data)?;
    header.verify(descriptor)?;

    match hint.variant() {
        Some(variant) => decode_variant(data, descriptor, header, variant),
        None => decode_auto(data, descriptor, header),
    }
}

/// Decode with a fixed layout. The header must already be verified.
pub fn decode_variant(
    data: &[u8],
    descriptor: &TerrainDescriptor,
    header: TerrainHeader,
    variant: TerrainFormatVariant,
) -> Result<DecodedTerrain, FormatError> {
    let offset = variant.payload_offset();
    let expected = descriptor.height_bytes()?;
    let available = data.len().saturating_sub(offset);
    if available < expected {
        return Err(FormatError::TruncatedHeights {
            layout: variant.to_string(),
            expected,
            available,
        });
    }

    let height_end = offset.checked_add(expected).ok_or_else(|| {
        FormatError::Descriptor(format!("height payload end overflows for size {}", descriptor.size))
    })?;
    let samples: Vec<u16> = data[offset..height_end]
        .chunks_exact(2)
        .map(|pair| variant.read_height([pair[0], pair[1]]))
        .collect();
    let heights = HeightGrid::new(descriptor.size, samples).ok_or_else(|| {
        FormatError::Descriptor("height payload does not fill the declared grid".into())
    })?;

    let layers = decode_layers(&data[height_end..], descriptor);

    Ok(DecodedTerrain {
        header,
        variant,
        heights,
        layers,
    })
}

/// Decode the layer payload, recovering complete rows from a short one.
fn decode_layers(payload: &[u8], descriptor: &TerrainDescriptor) -> Option<LayerGrid> {
    if !descriptor.has_layer_map() {
        if !payload.is_empty() {
            debug!("Ignoring {} trailing bytes: no layer map declared", payload.len());
        }
        return None;
    }
    if payload.is_empty() {
        debug!("Terrain has no layer payload");
        return None;
    }

    let side = descriptor.size as usize;
    let declared = descriptor.layer_bytes().ok()?;
    let rows = payload.len().min(declared) / side;
    let recovered = rows * side;

    let mut cells = vec![0u8; declared];
    cells[..recovered].copy_from_slice(&payload[..recovered]);

    if recovered < declared {
        warn!(
            "Layer payload truncated: {} of {declared} bytes, recovered {rows}/{side} rows",
            payload.len().min(declared)
        );
    }

    LayerGrid::new(descriptor.size, cells, rows as u32)
}

/// A decode is plausible when it is smooth. Legacy files are zero-padded
/// between the header and byte 2048, so a current-layout read whose whole
/// height window sits inside that padding must also be non-zero.
fn is_plausible(terrain: &DecodedTerrain) -> bool {
    let heights = &terrain.heights;
    if heights.roughness() > MAX_PLAUSIBLE_ROUGHNESS {
        return false;
    }
    let window = heights.samples().len().saturating_mul(HEIGHT_ITEM_SIZE as usize);
    let inside_padding = terrain.variant == TerrainFormatVariant::Current
        && CURRENT_PAYLOAD_OFFSET.saturating_add(window) <= LEGACY_PAYLOAD_OFFSET;
    !inside_padding || heights.samples().iter().any(|&h| h != 0)
}

fn decode_auto(
    data: &[u8],
    descriptor: &TerrainDescriptor,
    header: TerrainHeader,
) -> Result<DecodedTerrain, FormatError> {
    let current = decode_variant(data, descriptor, header, TerrainFormatVariant::Current);
    if let Ok(terrain) = &current {
        if is_plausible(terrain) {
            debug!("Terrain decoded with current layout");
            return current;
        }
    }

    let legacy = decode_variant(data, descriptor, header, TerrainFormatVariant::Legacy);
    match (current, legacy) {
        (_, Ok(terrain)) if is_plausible(&terrain) => {
            info!("Terrain decoded with legacy layout (offset 2048, big-endian)");
            Ok(terrain)
        }
        (Ok(terrain), _) => {
            warn!("Neither terrain layout looks plausible; keeping current layout");
            Ok(terrain)
        }
        (Err(e), Ok(terrain)) => {
            warn!("Current layout failed ({e}); using legacy layout");
            Ok(terrain)
        }
        (Err(e), Err(_)) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn descriptor(version: u8, size: u32, with_layers: bool) -> TerrainDescriptor {
        let cells = (size as u64) * (size as u64);
        TerrainDescriptor {
            version,
            size,
            height_map_size: cells,
            height_map_item_size: 2,
            layer_map_size: if with_layers { cells } else { 0 },
            layer_map_item_size: 1,
            materials: Vec::new(),
            datafile: None,
        }
    }

    fn header_bytes(version: u8, size: u32) -> Vec<u8> {
        let mut buf = vec![version];
        buf.extend_from_slice(&size.to_le_bytes());
        buf
    }

    fn encode_current(version: u8, size: u32, heights: &[u16], layers: &[u8]) -> Vec<u8> {
        let mut buf = header_bytes(version, size);
        for h in heights {
            buf.extend_from_slice(&h.to_le_bytes());
        }
        buf.extend_from_slice(layers);
        buf
    }

    fn encode_legacy(version: u8, size: u32, heights: &[u16], layers: &[u8]) -> Vec<u8> {
        let mut buf = header_bytes(version, size);
        buf.resize(LEGACY_PAYLOAD_OFFSET, 0);
        for h in heights {
            buf.extend_from_slice(&h.to_be_bytes());
        }
        buf.extend_from_slice(layers);
        buf
    }

    #[test]
    fn test_scenario_two_by_two_with_layers() {
        let desc = descriptor(1, 2, true);
        let data = encode_current(1, 2, &[100, 200, 300, 400], &[0, 1, 2, 3]);

        let terrain = decode(&data, &desc, TerrainFormatHint::Auto).unwrap();
        assert_eq!(terrain.variant, TerrainFormatVariant::Current);
        assert_eq!(terrain.heights.to_rows(), vec![vec![100, 200], vec![300, 400]]);
        let layers = terrain.layers.expect("layer grid");
        assert_eq!(layers.to_rows(), vec![vec![0, 1], vec![2, 3]]);
        assert!(!layers.is_partial());
    }

    #[test]
    fn test_roundtrip_sizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for size in [1u32, 2, 256] {
            let heights: Vec<u16> = (0..size * size)
                .map(|i| {
                    let (row, col) = (i / size, i % size);
                    (20_000 + row * 40 + col * 25) as u16 + rng.gen_range(0..50u16)
                })
                .collect();
            let data = encode_current(3, size, &heights, &[]);

            let terrain = decode(&data, &descriptor(3, size, false), TerrainFormatHint::Auto)
                .unwrap_or_else(|e| panic!("size {size}: {e}"));
            assert_eq!(terrain.heights.size(), size);
            assert_eq!(terrain.heights.samples(), &heights[..], "size {size}");
            assert!(terrain.layers.is_none());
        }
    }

    #[test]
    fn test_partial_layer_recovery() {
        let size = 4u32;
        let heights = vec![500u16; 16];
        // 16 declared layer bytes, 6 (1.5 rows) missing.
        let layers: Vec<u8> = (1..=10).collect();
        let data = encode_current(1, size, &heights, &layers);

        let terrain = decode(&data, &descriptor(1, size, true), TerrainFormatHint::Current).unwrap();
        let grid = terrain.layers.expect("partially recovered layer grid");
        assert_eq!(grid.size(), 4);
        assert_eq!(grid.cells().len(), 16);
        assert!(grid.is_partial());
        assert_eq!(grid.recovered_rows(), 2);
        assert_eq!(
            grid.to_rows(),
            vec![
                vec![1, 2, 3, 4],
                vec![5, 6, 7, 8],
                vec![0, 0, 0, 0],
                vec![0, 0, 0, 0],
            ]
        );
    }

    #[test]
    fn test_zero_layer_bytes_means_no_layer_grid() {
        let data = encode_current(1, 2, &[1, 2, 3, 4], &[]);
        let terrain = decode(&data, &descriptor(1, 2, true), TerrainFormatHint::Current).unwrap();
        assert!(terrain.layers.is_none());
    }

    #[test]
    fn test_header_mismatch_is_fatal() {
        let data = encode_current(2, 2, &[1, 2, 3, 4], &[]);
        let err = decode(&data, &descriptor(1, 2, false), TerrainFormatHint::Auto).unwrap_err();
        assert!(matches!(
            err,
            FormatError::HeaderMismatch {
                expected_version: 1,
                found_version: 2,
                ..
            }
        ));

        let data = encode_current(1, 3, &[0; 9], &[]);
        assert!(decode(&data, &descriptor(1, 2, false), TerrainFormatHint::Auto).is_err());
    }

    #[test]
    fn test_truncated_heights_fail() {
        let mut data = encode_current(1, 2, &[1, 2, 3, 4], &[]);
        data.truncate(data.len() - 1);
        let err = decode(&data, &descriptor(1, 2, false), TerrainFormatHint::Current).unwrap_err();
        assert_eq!(
            err,
            FormatError::TruncatedHeights {
                layout: "current".into(),
                expected: 8,
                available: 7,
            }
        );
        assert!(decode(&data, &descriptor(1, 2, false), TerrainFormatHint::Auto).is_err());
    }

    #[test]
    fn test_legacy_layout_forced() {
        let heights = [0x0102u16, 0x0304, 0x0506, 0x0708];
        let data = encode_legacy(1, 2, &heights, &[3, 2, 1, 0]);

        let terrain = decode(&data, &descriptor(1, 2, true), TerrainFormatHint::Legacy).unwrap();
        assert_eq!(terrain.variant, TerrainFormatVariant::Legacy);
        assert_eq!(terrain.heights.samples(), &heights[..]);
        assert_eq!(terrain.layers.unwrap().cells(), &[3, 2, 1, 0]);
    }

    #[test]
    fn test_auto_falls_back_to_legacy() {
        let heights: Vec<u16> = (0..16u16).map(|i| 1200 + i * 3).collect();
        let data = encode_legacy(1, 4, &heights, &[]);

        let terrain = decode(&data, &descriptor(1, 4, false), TerrainFormatHint::Auto).unwrap();
        assert_eq!(terrain.variant, TerrainFormatVariant::Legacy);
        assert_eq!(terrain.heights.samples(), &heights[..]);
    }

    #[test]
    fn test_auto_keeps_current_when_legacy_is_noise() {
        // Large enough that the legacy offset lands inside the current payload.
        let size = 48u32;
        let heights: Vec<u16> = (0..size * size).map(|i| 3000 + (i % size) as u16).collect();
        let layers: Vec<u8> = (0..size * size).map(|i| (i % 7) as u8).collect();
        let data = encode_current(1, size, &heights, &layers);
        assert!(data.len() >= LEGACY_PAYLOAD_OFFSET + (size * size * 2) as usize);

        let terrain = decode(&data, &descriptor(1, size, true), TerrainFormatHint::Auto).unwrap();
        assert_eq!(terrain.variant, TerrainFormatVariant::Current);
        assert_eq!(terrain.heights.samples(), &heights[..]);
    }

    #[test]
    fn test_trailing_bytes_without_layer_map() {
        let data = encode_current(1, 1, &[9], &[1, 2, 3]);
        let terrain = decode(&data, &descriptor(1, 1, false), TerrainFormatHint::Auto).unwrap();
        assert!(terrain.layers.is_none());
        assert_eq!(terrain.heights.samples(), &[9]);
    }

    #[test]
    fn test_auto_keeps_flat_current_terrain() {
        // All water: every height is zero, and the file is long enough for
        // a legacy read to succeed.
        let size = 256u32;
        let heights = vec![0u16; (size * size) as usize];
        let layers: Vec<u8> = (0..size * size).map(|i| (i % 5) as u8).collect();
        let data = encode_current(1, size, &heights, &layers);

        let terrain = decode(&data, &descriptor(1, size, true), TerrainFormatHint::Auto).unwrap();
        assert_eq!(terrain.variant, TerrainFormatVariant::Current);
        assert!(terrain.heights.samples().iter().all(|&h| h == 0));
        assert_eq!(terrain.layers.unwrap().cells(), &layers[..]);
    }

    #[test]
    fn test_oversized_descriptor_is_rejected() {
        let desc = descriptor(1, u32::MAX, false);
        let data = header_bytes(1, u32::MAX);

        let err = decode(&data, &desc, TerrainFormatHint::Current).unwrap_err();
        assert!(matches!(err, FormatError::Descriptor(_)));
    }
}
