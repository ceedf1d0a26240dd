use std::path::{Path, PathBuf};

use crate::engine::types::TimeStep;

/// Stable 3-decimal label for a cell size. The quantum matches the registry's
/// comparison tolerance, so labels round-trip through a directory scan.
pub fn cell_size_label(cell_size: f32) -> String {
    format!("{:.3}", cell_size)
}

pub fn index_dir(base: &Path, cell_size: f32) -> PathBuf {
    base.join(format!("cell_{}", cell_size_label(cell_size)))
}

pub fn index_file(base: &Path, cell_size: f32, time_step: TimeStep) -> PathBuf {
    index_dir(base, cell_size).join(format!("index_{time_step}.bin"))
}

pub fn parse_cell_size_dir(name: &str) -> Option<f32> {
    name.strip_prefix("cell_")?.parse().ok()
}

pub fn parse_index_file(name: &str) -> Option<TimeStep> {
    name.strip_prefix("index_")?.strip_suffix(".bin")?.parse().ok()
}
