//! Road discovery across a level directory.
//!
//! Road containers come in two shapes: a JSON array of objects, or one
//! object per line. Files are parsed in parallel; the merge that drops
//! duplicate ids runs afterwards on a single thread, in discovery order.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use rayon::prelude::*;
use serde_json::Value;
use trackside_core::discovery::{discover_files, relative_slash_path};
use trackside_core::{LevelError, ValidationError};

use crate::road::{is_road_candidate, Road, RoadRecord};

/// Result of scanning one road container.
#[derive(Debug, Clone, Default)]
pub struct FileRoads {
    pub roads: Vec<Road>,
    /// Candidates that failed validation.
    pub rejected: usize,
    /// Lines that were not valid JSON.
    pub unparsable_lines: usize,
}

/// Roads found in a level plus bookkeeping for diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadScan {
    pub roads: Vec<Road>,
    pub files_scanned: usize,
    pub files_failed: usize,
    pub records_rejected: usize,
    pub unparsable_lines: usize,
    pub duplicates_dropped: usize,
}

/// All valid, unique roads under `directory`.
pub fn scan<S: AsRef<str>>(directory: &Path, patterns: &[S]) -> Vec<Road> {
    scan_report(directory, patterns).roads
}

/// Like [`scan`], keeping the counts of what was skipped.
pub fn scan_report<S: AsRef<str>>(directory: &Path, patterns: &[S]) -> RoadScan {
    let files = discover_files(directory, patterns);
    debug!("{} road container(s) under {}", files.len(), directory.display());

    let parsed: Vec<(PathBuf, Result<FileRoads, LevelError>)> = files
        .into_par_iter()
        .map(|path| {
            let result = parse_road_file(directory, &path);
            (path, result)
        })
        .collect();

    let mut scan = RoadScan::default();
    let mut seen = HashSet::new();
    for (path, result) in parsed {
        let file = match result {
            Ok(file) => file,
            Err(e) => {
                warn!("Skipping road file {}: {e}", path.display());
                scan.files_failed += 1;
                continue;
            }
        };
        scan.files_scanned += 1;
        scan.records_rejected += file.rejected;
        scan.unparsable_lines += file.unparsable_lines;

        for road in file.roads {
            if seen.insert(road.id.clone()) {
                scan.roads.push(road);
            } else {
                debug!("Dropping duplicate road {} from {}", road.id, path.display());
                scan.duplicates_dropped += 1;
            }
        }
    }

    info!(
        "Found {} unique road(s) in {} file(s); {} rejected, {} duplicate(s)",
        scan.roads.len(),
        scan.files_scanned,
        scan.records_rejected,
        scan.duplicates_dropped
    );
    scan
}

/// Read and parse one road container.
pub fn parse_road_file(root: &Path, path: &Path) -> Result<FileRoads, LevelError> {
    let text = std::fs::read_to_string(path).map_err(|e| LevelError::io(path, e))?;
    let label = relative_slash_path(root, path).unwrap_or_else(|| path.display().to_string());
    parse_road_text(&text, &label).map_err(|e| LevelError::json(path, e))
}

/// Parse road container text. `label` names the source in logs and in
/// fallback ids for records without a `persistentId`.
///
/// Fails only when an array-shaped file is not valid JSON as a whole.
pub fn parse_road_text(text: &str, label: &str) -> Result<FileRoads, serde_json::Error> {
    let text = text.trim_start_matches('\u{feff}');
    let mut file = FileRoads::default();

    let body = text.trim_start();
    if body.starts_with('[') {
        let items: Vec<Value> = serde_json::from_str(body)?;
        for (index, item) in items.into_iter().enumerate() {
            accept(&mut file, item, label, index + 1);
        }
    } else {
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(line) {
                Ok(item) => accept(&mut file, item, label, index + 1),
                Err(e) => {
                    debug!("{label}:{}: skipping unparsable line: {e}", index + 1);
                    file.unparsable_lines += 1;
                }
            }
        }
    }

    if !file.roads.is_empty() {
        debug!("{label}: {} road(s)", file.roads.len());
    }
    Ok(file)
}

fn accept(file: &mut FileRoads, item: Value, label: &str, ordinal: usize) {
    if !is_road_candidate(&item) {
        return;
    }
    match build_road(item, label, ordinal) {
        Ok(road) => file.roads.push(road),
        Err(e) => {
            warn!("{label}: skipping invalid road: {e}");
            file.rejected += 1;
        }
    }
}

fn build_road(item: Value, label: &str, ordinal: usize) -> Result<Road, ValidationError> {
    let mut record: RoadRecord =
        serde_json::from_value(item).map_err(|e| ValidationError::MalformedRecord {
            kind: "DecalRoad",
            reason: e.to_string(),
        })?;
    if record.persistent_id.is_empty() {
        record.persistent_id = format!("{label}#{ordinal}");
    }
    Road::try_from(record)
}
