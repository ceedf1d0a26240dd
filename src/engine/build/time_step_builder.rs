use std::collections::BTreeMap;

use tracing::warn;

use crate::engine::core::cell::grid::Cell;
use crate::engine::core::{Grid, IndexEntry, IndexHeader, IndexRecord};
use crate::engine::types::{TimeStep, TrajectoryId, TrajectorySample};

/// Per-time-step accounting, aggregated into the final build report.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeStepStats {
    pub indexed: usize,
    pub skipped_nan: usize,
    pub skipped_out_of_bounds: usize,
    pub duplicate_ids: usize,
}

/// Builds one time step's [`IndexRecord`] from its bucketed samples.
///
/// Duplicate trajectory ids are an upstream contract violation; the last
/// occurrence wins and a warning is logged. NaN and out-of-bbox samples are
/// dropped and counted. Ids come out ascending inside each cell.
pub fn build_record(
    time_step: TimeStep,
    samples: &[TrajectorySample],
    grid: &Grid,
    bbox_max: [f32; 3],
) -> (IndexRecord, TimeStepStats) {
    let mut stats = TimeStepStats::default();

    let mut by_id: BTreeMap<TrajectoryId, [f32; 3]> = BTreeMap::new();
    for sample in samples {
        if !sample.is_valid() {
            stats.skipped_nan += 1;
            continue;
        }
        if by_id.insert(sample.trajectory_id, sample.position).is_some() {
            stats.duplicate_ids += 1;
            warn!(
                target: "trajhash::build",
                trajectory_id = sample.trajectory_id,
                time_step,
                "Duplicate trajectory id within one time step; keeping the last sample"
            );
        }
    }

    let top_cell: Cell = grid.cell_of(bbox_max);
    let mut cells: BTreeMap<u64, Vec<TrajectoryId>> = BTreeMap::new();
    for (&id, &position) in &by_id {
        let cell = grid.cell_of(position);
        if !Grid::cell_in_lattice(cell)
            || cell.0 > top_cell.0
            || cell.1 > top_cell.1
            || cell.2 > top_cell.2
        {
            stats.skipped_out_of_bounds += 1;
            warn!(
                target: "trajhash::build",
                trajectory_id = id,
                time_step,
                ?cell,
                "Sample outside the bounding box; rejected"
            );
            continue;
        }
        cells.entry(grid.z_of(cell)).or_default().push(id);
    }

    let mut entries = Vec::with_capacity(cells.len());
    let mut ids = Vec::new();
    for (z_key, cell_ids) in cells {
        entries.push(IndexEntry {
            z_key,
            start_index: ids.len() as u32,
            count: cell_ids.len() as u32,
        });
        ids.extend(cell_ids);
    }
    stats.indexed = ids.len();

    let header = IndexHeader {
        time_step,
        cell_size: grid.cell_size,
        bbox_min: grid.bbox_min,
        bbox_max,
        n_entries: entries.len() as u32,
        n_ids: ids.len() as u32,
    };

    (
        IndexRecord {
            header,
            entries,
            ids,
        },
        stats,
    )
}
