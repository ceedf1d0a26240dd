use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::engine::errors::StoreError;
use crate::engine::types::TimeStep;

/// Extracts the trailing integer token of a shard file name, e.g.
/// `traj_0005.shard` → 5. Shard enumeration orders files by this number.
pub fn parse_time_step(file_name: &str) -> Option<TimeStep> {
    let stem = file_name
        .rsplit_once('.')
        .map(|(s, _)| s)
        .unwrap_or(file_name);
    let token = stem.rsplit(['_', '-']).next()?;
    token.parse().ok()
}

/// Shard files in `dir`, sorted by the time step parsed from their names.
/// Files without a parseable suffix are skipped with a warning.
pub fn sorted_shard_files(dir: &Path) -> Result<Vec<(TimeStep, PathBuf)>, StoreError> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        match parse_time_step(&name) {
            Some(t) => out.push((t, entry.path())),
            None => {
                warn!(
                    target: "trajhash::store",
                    file = %name,
                    "Skipping shard file without a time-step suffix"
                );
            }
        }
    }
    out.sort_by_key(|(t, _)| *t);
    Ok(out)
}
