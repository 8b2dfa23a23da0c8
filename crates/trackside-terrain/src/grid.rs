//! Decoded terrain grids and their statistics.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use trackside_core::constants::TERRAIN_HEADER_SIZE;
use trackside_core::FormatError;

use crate::descriptor::TerrainDescriptor;

/// The 5-byte header at the start of every terrain container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TerrainHeader {
    pub format_version: u8,
    /// Grid side length in samples.
    pub grid_size: u32,
}

impl TerrainHeader {
    /// Read the version byte and little-endian size.
    pub fn parse(data: &[u8]) -> Result<Self, FormatError> {
        if data.len() < TERRAIN_HEADER_SIZE {
            return Err(FormatError::TruncatedHeader { len: data.len() });
        }
        Ok(Self {
            format_version: data[0],
            grid_size: u32::from_le_bytes([data[1], data[2], data[3], data[4]]),
        })
    }

    /// The header must agree with the descriptor on version and size.
    pub fn verify(&self, descriptor: &TerrainDescriptor) -> Result<(), FormatError> {
        if self.format_version != descriptor.version || self.grid_size != descriptor.size {
            return Err(FormatError::HeaderMismatch {
                expected_version: descriptor.version,
                expected_size: descriptor.size,
                found_version: self.format_version,
                found_size: self.grid_size,
            });
        }
        Ok(())
    }
}

/// Square grid of u16 elevation samples, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightGrid {
    size: u32,
    samples: Vec<u16>,
}

impl HeightGrid {
    /// Returns None unless `size >= 1` and `samples.len() == size²`.
    pub fn new(size: u32, samples: Vec<u16>) -> Option<Self> {
        let side = size as usize;
        if size == 0 || side.checked_mul(side) != Some(samples.len()) {
            return None;
        }
        Some(Self { size, samples })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// All samples, row-major.
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u16> {
        let n = self.size as usize;
        if row >= n || col >= n {
            return None;
        }
        Some(self.samples[row * n + col])
    }

    pub fn row(&self, row: usize) -> Option<&[u16]> {
        let n = self.size as usize;
        (row < n).then(|| &self.samples[row * n..(row + 1) * n])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u16]> {
        self.samples.chunks_exact(self.size as usize)
    }

    pub fn to_rows(&self) -> Vec<Vec<u16>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// Mean absolute difference between horizontal neighbours, normalized
    /// to the u16 range. Real terrain is smooth; byte-swapped data is not.
    pub fn roughness(&self) -> f64 {
        let mut sum = 0u64;
        let mut count = 0u64;
        for row in self.rows() {
            for pair in row.windows(2) {
                sum += pair[0].abs_diff(pair[1]) as u64;
                count += 1;
            }
        }
        if count == 0 {
            return 0.0;
        }
        sum as f64 / count as f64 / u16::MAX as f64
    }

    pub fn stats(&self) -> HeightStats {
        let n = self.samples.len();
        let min = self.samples.iter().copied().min().unwrap_or(0);
        let max = self.samples.iter().copied().max().unwrap_or(0);
        let mean = self.samples.iter().map(|&v| v as f64).sum::<f64>() / n.max(1) as f64;
        let variance = self
            .samples
            .iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / n.max(1) as f64;
        let mut sorted = self.samples.clone();
        sorted.sort_unstable();
        let median = match n {
            0 => 0.0,
            _ if n % 2 == 1 => sorted[n / 2] as f64,
            _ => (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0,
        };
        let distinct_values = self.samples.iter().collect::<HashSet<_>>().len();
        let zero_count = self.samples.iter().filter(|&&v| v == 0).count();

        HeightStats {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
            distinct_values,
            zero_count,
            zero_percentage: zero_count as f64 / n.max(1) as f64 * 100.0,
        }
    }
}

/// Summary of a height grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeightStats {
    pub min: u16,
    pub max: u16,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub distinct_values: usize,
    /// Samples at exactly 0 (typically water or unfilled area).
    pub zero_count: usize,
    pub zero_percentage: f64,
}

/// Square grid of u8 material-layer indices, row-major.
///
/// A truncated payload still yields the declared shape: rows past
/// `recovered_rows` are zero-filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerGrid {
    size: u32,
    cells: Vec<u8>,
    recovered_rows: u32,
}

impl LayerGrid {
    /// Returns None unless `size >= 1`, `cells.len() == size²` and
    /// `recovered_rows <= size`.
    pub fn new(size: u32, cells: Vec<u8>, recovered_rows: u32) -> Option<Self> {
        let side = size as usize;
        if size == 0 || side.checked_mul(side) != Some(cells.len()) || recovered_rows > size {
            return None;
        }
        Some(Self {
            size,
            cells,
            recovered_rows,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        let n = self.size as usize;
        if row >= n || col >= n {
            return None;
        }
        Some(self.cells[row * n + col])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks_exact(self.size as usize)
    }

    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// Rows decoded from the payload; the rest are padding.
    pub fn recovered_rows(&self) -> u32 {
        self.recovered_rows
    }

    pub fn is_partial(&self) -> bool {
        self.recovered_rows < self.size
    }

    /// Cell counts per layer index, named through the descriptor's material list.
    pub fn usage(&self, materials: &[String]) -> LayerUsage {
        let mut counts: BTreeMap<u8, usize> = BTreeMap::new();
        for &cell in &self.cells {
            *counts.entry(cell).or_default() += 1;
        }

        let total = self.cells.len().max(1) as f64;
        let entries = counts
            .into_iter()
            .map(|(index, count)| LayerUsageEntry {
                index,
                material: materials.get(index as usize).cloned(),
                count,
                percentage: count as f64 / total * 100.0,
            })
            .collect();

        LayerUsage { entries }
    }
}

/// Per-index layer usage, ordered by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerUsage {
    pub entries: Vec<LayerUsageEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerUsageEntry {
    pub index: u8,
    /// None when the index is beyond the descriptor's material list.
    pub material: Option<String>,
    pub count: usize,
    pub percentage: f64,
}

impl LayerUsage {
    /// Number of distinct layer indices present.
    pub fn distinct_layers(&self) -> usize {
        self.entries.len()
    }

    /// Cells whose index has no material name.
    pub fn unknown_cells(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.material.is_none())
            .map(|e| e.count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(version: u8, size: u32) -> TerrainDescriptor {
        TerrainDescriptor {
            version,
            size,
            height_map_size: (size * size) as u64,
            height_map_item_size: 2,
            layer_map_size: 0,
            layer_map_item_size: 1,
            materials: Vec::new(),
            datafile: None,
        }
    }

    #[test]
    fn test_header_parse_and_verify() {
        let data = [7u8, 0x00, 0x04, 0x00, 0x00, 0xFF];
        let header = TerrainHeader::parse(&data).unwrap();
        assert_eq!(header.format_version, 7);
        assert_eq!(header.grid_size, 1024);
        assert!(header.verify(&descriptor(7, 1024)).is_ok());
        assert!(matches!(
            header.verify(&descriptor(8, 1024)),
            Err(FormatError::HeaderMismatch { .. })
        ));
    }

    #[test]
    fn test_header_too_short() {
        assert_eq!(
            TerrainHeader::parse(&[1, 2, 3]),
            Err(FormatError::TruncatedHeader { len: 3 })
        );
    }

    #[test]
    fn test_height_grid_shape() {
        assert!(HeightGrid::new(2, vec![1, 2, 3]).is_none());
        let grid = HeightGrid::new(2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(grid.get(1, 0), Some(3));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.row(1), Some(&[3u16, 4][..]));
        assert_eq!(grid.to_rows(), vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_height_stats() {
        #[rustfmt::skip]
        let grid = HeightGrid::new(3, vec![
            0,   0, 100,
            100, 200, 200,
            300, 300, 600,
        ]).unwrap();
        let stats = grid.stats();
        assert_eq!(stats.min, 0);
        assert_eq!(stats.max, 600);
        assert!((stats.mean - 200.0).abs() < 1e-9);
        assert_eq!(stats.median, 200.0);
        assert_eq!(stats.distinct_values, 5);
        assert_eq!(stats.zero_count, 2);
        assert!((stats.zero_percentage - 200.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_median_of_even_count_averages_middle_pair() {
        let grid = HeightGrid::new(2, vec![40, 10, 30, 20]).unwrap();
        assert_eq!(grid.stats().median, 25.0);
    }

    #[test]
    fn test_empty_grids_rejected() {
        assert!(HeightGrid::new(0, vec![]).is_none());
        assert!(LayerGrid::new(0, vec![], 0).is_none());
    }

    #[test]
    fn test_roughness_separates_smooth_from_noise() {
        let smooth: Vec<u16> = (0..16u16).map(|i| 1000 + i * 10).collect();
        let noisy: Vec<u16> = (0..16u16)
            .map(|i| if i % 2 == 0 { 0x0100 } else { 0xF000 })
            .collect();
        let smooth = HeightGrid::new(4, smooth).unwrap();
        let noisy = HeightGrid::new(4, noisy).unwrap();
        assert!(smooth.roughness() < 0.01);
        assert!(noisy.roughness() > 0.5);
        assert_eq!(HeightGrid::new(1, vec![42]).unwrap().roughness(), 0.0);
    }

    #[test]
    fn test_layer_usage_names_materials() {
        let grid = LayerGrid::new(2, vec![0, 1, 1, 5], 2).unwrap();
        assert!(!grid.is_partial());
        let usage = grid.usage(&["grass".to_string(), "rock".to_string()]);
        assert_eq!(usage.distinct_layers(), 3);
        assert_eq!(usage.entries[1].material.as_deref(), Some("rock"));
        assert_eq!(usage.entries[1].count, 2);
        assert!((usage.entries[1].percentage - 50.0).abs() < 1e-9);
        assert_eq!(usage.unknown_cells(), 1);
    }

    #[test]
    fn test_layer_grid_partial_flag() {
        let grid = LayerGrid::new(2, vec![1, 2, 0, 0], 1).unwrap();
        assert!(grid.is_partial());
        assert_eq!(grid.recovered_rows(), 1);
        assert!(LayerGrid::new(2, vec![0; 4], 3).is_none());
    }
}
