use crate::engine::core::cell::morton::{MAX_CELL_COORD, encode_z};

pub type Cell = (i64, i64, i64);

/// Maps world positions onto the integer cell lattice of one index.
///
/// Cells are axis-aligned cubes of side `cell_size` anchored at `bbox_min`.
/// Coordinates outside the bounding box are undefined inputs: the builder
/// rejects them, the query side clamps them away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub bbox_min: [f32; 3],
    pub cell_size: f32,
}

impl Grid {
    pub fn new(bbox_min: [f32; 3], cell_size: f32) -> Self {
        Self { bbox_min, cell_size }
    }

    /// Componentwise `floor((p - bbox_min) / cell_size)`.
    #[inline]
    pub fn cell_of(&self, p: [f32; 3]) -> Cell {
        let c = |axis: usize| ((p[axis] - self.bbox_min[axis]) / self.cell_size).floor() as i64;
        (c(0), c(1), c(2))
    }

    /// Z-order key of a cell already known to be inside the lattice.
    #[inline]
    pub fn z_of(&self, cell: Cell) -> u64 {
        encode_z(cell.0 as u64, cell.1 as u64, cell.2 as u64)
    }

    /// True when every coordinate fits the 21 bits a Z-order key carries.
    #[inline]
    pub fn cell_in_lattice(cell: Cell) -> bool {
        [cell.0, cell.1, cell.2]
            .iter()
            .all(|&c| c >= 0 && c as u64 <= MAX_CELL_COORD)
    }

    /// Inclusive cell box overlapping a sphere: the center cell expanded by
    /// `ceil(radius / cell_size)` on every axis. Conservative super-set; exact
    /// sphere/cell overlap is left to phase-2 refinement.
    pub fn range_for_sphere(&self, center: [f32; 3], radius: f32) -> (Cell, Cell) {
        let (cx, cy, cz) = self.cell_of(center);
        let reach = (radius / self.cell_size).ceil() as i64;
        (
            (cx - reach, cy - reach, cz - reach),
            (cx + reach, cy + reach, cz + reach),
        )
    }

    /// Query-side sphere range, clamped to `[0, cell_of(bbox_max)]` per axis
    /// and to the lattice ceiling. The result may come back inverted, which
    /// enumerates no cells.
    pub fn clamped_range_for_sphere(
        &self,
        center: [f32; 3],
        radius: f32,
        bbox_max: [f32; 3],
    ) -> (Cell, Cell) {
        let (lo, hi) = self.range_for_sphere(center, radius);
        let top = self.cell_of(bbox_max);
        let clamp_hi = |v: i64, t: i64| v.min(t).min(MAX_CELL_COORD as i64);
        (
            (lo.0.max(0), lo.1.max(0), lo.2.max(0)),
            (
                clamp_hi(hi.0, top.0),
                clamp_hi(hi.1, top.1),
                clamp_hi(hi.2, top.2),
            ),
        )
    }
}
