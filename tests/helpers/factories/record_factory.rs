use crate::engine::core::{IndexEntry, IndexHeader, IndexRecord, encode_z};
use crate::engine::types::{TimeStep, TrajectoryId};

/// Builds a valid [`IndexRecord`] from lattice cells and their id lists.
/// Entries come out sorted by Z-order key with the canonical contiguous
/// id layout, whatever order the cells were given in.
pub struct RecordFactory {
    time_step: TimeStep,
    cell_size: f32,
    bbox_min: [f32; 3],
    bbox_max: [f32; 3],
    cells: Vec<((u64, u64, u64), Vec<TrajectoryId>)>,
}

impl RecordFactory {
    pub fn new() -> Self {
        Self {
            time_step: 0,
            cell_size: 10.0,
            bbox_min: [0.0, 0.0, 0.0],
            bbox_max: [100.0, 100.0, 100.0],
            cells: Vec::new(),
        }
    }

    pub fn with_time_step(mut self, time_step: TimeStep) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_bbox(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.bbox_min = min;
        self.bbox_max = max;
        self
    }

    pub fn with_cell(mut self, cell: (u64, u64, u64), ids: Vec<TrajectoryId>) -> Self {
        self.cells.push((cell, ids));
        self
    }

    pub fn create(self) -> IndexRecord {
        let mut keyed: Vec<(u64, Vec<TrajectoryId>)> = self
            .cells
            .into_iter()
            .map(|((cx, cy, cz), ids)| (encode_z(cx, cy, cz), ids))
            .collect();
        keyed.sort_by_key(|(z, _)| *z);

        let mut entries = Vec::with_capacity(keyed.len());
        let mut ids = Vec::new();
        for (z_key, cell_ids) in keyed {
            entries.push(IndexEntry {
                z_key,
                start_index: ids.len() as u32,
                count: cell_ids.len() as u32,
            });
            ids.extend(cell_ids);
        }

        IndexRecord {
            header: IndexHeader {
                time_step: self.time_step,
                cell_size: self.cell_size,
                bbox_min: self.bbox_min,
                bbox_max: self.bbox_max,
                n_entries: entries.len() as u32,
                n_ids: ids.len() as u32,
            },
            entries,
            ids,
        }
    }
}
