use std::io::Write;

use crate::engine::core::index::header::IndexHeader;
use crate::engine::errors::CodecError;
use crate::engine::types::TrajectoryId;

/// One 16-byte directory entry: a cell's Z-order key and its id range in the
/// trailing payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub z_key: u64,
    pub start_index: u32,
    pub count: u32,
}

impl IndexEntry {
    pub const LEN: usize = 16;

    pub fn write_to<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        w.write_all(&self.z_key.to_le_bytes())?;
        w.write_all(&self.start_index.to_le_bytes())?;
        w.write_all(&self.count.to_le_bytes())?;
        Ok(())
    }

    /// Decodes one entry from a 16-byte slice.
    pub fn read_from(buf: &[u8]) -> Self {
        Self {
            z_key: u64::from_le_bytes(buf[0..8].try_into().unwrap()),
            start_index: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
            count: u32::from_le_bytes(buf[12..16].try_into().unwrap()),
        }
    }
}

/// A fully materialized per-time-step index, as the builder produces it.
/// Immutable once written; readers use [`super::reader::IndexHandle`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub header: IndexHeader,
    pub entries: Vec<IndexEntry>,
    pub ids: Vec<TrajectoryId>,
}

impl IndexRecord {
    /// Total on-disk size of the record.
    pub fn file_len(&self) -> u64 {
        (IndexHeader::LEN + IndexEntry::LEN * self.entries.len() + 4 * self.ids.len()) as u64
    }

    /// Checks every structural invariant a valid record must hold: counts
    /// matching the header, positive cell size, ordered bbox, strictly
    /// ascending unique Z-order keys, and the canonical contiguous id layout.
    pub fn validate(&self) -> Result<(), CodecError> {
        let h = &self.header;
        if h.n_entries as usize != self.entries.len() {
            return Err(CodecError::Format(format!(
                "header n_entries={} but {} entries present",
                h.n_entries,
                self.entries.len()
            )));
        }
        if h.n_ids as usize != self.ids.len() {
            return Err(CodecError::Format(format!(
                "header n_ids={} but {} ids present",
                h.n_ids,
                self.ids.len()
            )));
        }
        if !(h.cell_size > 0.0) {
            return Err(CodecError::Format(format!(
                "cell_size must be positive, got {}",
                h.cell_size
            )));
        }
        for axis in 0..3 {
            if h.bbox_min[axis] > h.bbox_max[axis] {
                return Err(CodecError::Format(format!(
                    "bbox_min exceeds bbox_max on axis {axis}"
                )));
            }
        }

        let mut expected_start: u32 = 0;
        let mut prev_key: Option<u64> = None;
        for entry in &self.entries {
            if let Some(prev) = prev_key {
                if entry.z_key <= prev {
                    return Err(CodecError::Format(format!(
                        "entries not strictly sorted at z_key {}",
                        entry.z_key
                    )));
                }
            }
            prev_key = Some(entry.z_key);

            if entry.start_index != expected_start {
                return Err(CodecError::Format(format!(
                    "non-contiguous id layout at z_key {}: start_index={} expected {}",
                    entry.z_key, entry.start_index, expected_start
                )));
            }
            expected_start = expected_start
                .checked_add(entry.count)
                .ok_or_else(|| CodecError::Format("id count overflow".into()))?;
        }
        if expected_start != h.n_ids {
            return Err(CodecError::Format(format!(
                "entry counts sum to {} but n_ids={}",
                expected_start, h.n_ids
            )));
        }
        Ok(())
    }
}
