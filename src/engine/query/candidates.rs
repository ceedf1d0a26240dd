use tracing::debug;

use crate::engine::registry::IndexRegistry;
use crate::engine::types::{TimeStep, TrajectoryId};

/// Outcome of one per-time-step candidate gather.
///
/// `loaded == false` is the "no index record" signal; it is never an error.
#[derive(Debug, Default, Clone)]
pub struct Gather {
    pub loaded: bool,
    pub ids: Vec<TrajectoryId>,
    pub cells_scanned: usize,
    pub cells_hit: usize,
}

/// Collects candidate trajectory ids for a sphere at one time step.
///
/// Walks the clamped cell box around the sphere, binary-searches each cell in
/// the record's directory and streams the hits' id lists from the mapped
/// file. The result is sorted and deduplicated.
pub fn gather(
    registry: &IndexRegistry,
    cell_size: f32,
    time_step: TimeStep,
    center: [f32; 3],
    radius: f32,
) -> Gather {
    let Some(handle) = registry.get(cell_size, time_step) else {
        debug!(
            target: "trajhash::query",
            time_step, "No index record loaded; gather is empty"
        );
        return Gather::default();
    };

    let grid = handle.grid();
    let bbox_max = handle.header().bbox_max;
    let (lo, hi) = grid.clamped_range_for_sphere(center, radius, bbox_max);

    let mut out = Gather {
        loaded: true,
        ..Gather::default()
    };
    for cz in lo.2..=hi.2 {
        for cy in lo.1..=hi.1 {
            for cx in lo.0..=hi.0 {
                out.cells_scanned += 1;
                let z_key = grid.z_of((cx, cy, cz));
                if let Some(entry) = handle.find_entry(z_key) {
                    out.cells_hit += 1;
                    out.ids.extend(handle.ids_for(entry));
                }
            }
        }
    }

    // ids are unique within one record, but gathers merge across time steps
    // downstream, so normalize here once
    out.ids.sort_unstable();
    out.ids.dedup();

    debug!(
        target: "trajhash::query",
        time_step,
        cells_scanned = out.cells_scanned,
        cells_hit = out.cells_hit,
        candidates = out.ids.len(),
        "Candidate gather done"
    );
    out
}
