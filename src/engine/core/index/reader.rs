use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use tracing::{debug, error};

use crate::engine::core::Grid;
use crate::engine::core::index::header::IndexHeader;
use crate::engine::core::index::record::IndexEntry;
use crate::engine::errors::CodecError;
use crate::engine::types::TrajectoryId;

/// An opened, immutable `TSHT` index file.
///
/// The entry directory is decoded eagerly (16 bytes per cell, hot at query
/// time); the id payload stays in the mapping and is decoded per cell on
/// demand. The mapping is never written, so concurrent reads from any number
/// of threads need no coordination.
#[derive(Debug)]
pub struct IndexHandle {
    path: PathBuf,
    header: IndexHeader,
    entries: Vec<IndexEntry>,
    mmap: Mmap,
}

impl IndexHandle {
    /// Opens and validates an index file. Magic, version, declared sizes and
    /// the entry directory's invariants are all checked here; a failure is
    /// final and never retried.
    pub fn open(path: &Path) -> Result<Self, CodecError> {
        let file = File::open(path).map_err(|e| {
            error!(target: "trajhash::index", error = %e, path = %path.display(), "Failed to open index file");
            CodecError::Io(e)
        })?;
        let mmap = unsafe {
            Mmap::map(&file).map_err(|e| {
                error!(target: "trajhash::index", error = %e, path = %path.display(), "Failed to memory-map index file");
                CodecError::Io(e)
            })?
        };

        let header = IndexHeader::read_from(&mmap)?;
        let n_entries = header.n_entries as usize;
        let n_ids = header.n_ids as usize;
        let expected = IndexHeader::LEN + IndexEntry::LEN * n_entries + 4 * n_ids;
        if mmap.len() != expected {
            return Err(CodecError::Format(format!(
                "size mismatch: file is {} bytes, header declares {}",
                mmap.len(),
                expected
            )));
        }

        let mut entries = Vec::with_capacity(n_entries);
        let mut prev_key: Option<u64> = None;
        for i in 0..n_entries {
            let off = IndexHeader::LEN + IndexEntry::LEN * i;
            let entry = IndexEntry::read_from(&mmap[off..off + IndexEntry::LEN]);
            if let Some(prev) = prev_key {
                if entry.z_key <= prev {
                    return Err(CodecError::Format(format!(
                        "entry directory not strictly sorted at index {i}"
                    )));
                }
            }
            prev_key = Some(entry.z_key);
            let end = entry.start_index as u64 + entry.count as u64;
            if end > header.n_ids as u64 {
                return Err(CodecError::Format(format!(
                    "entry {i} id range [{}, {end}) exceeds n_ids={}",
                    entry.start_index, header.n_ids
                )));
            }
            entries.push(entry);
        }

        debug!(
            target: "trajhash::index",
            path = %path.display(),
            time_step = header.time_step,
            entries = n_entries,
            ids = n_ids,
            "Opened index record"
        );

        Ok(Self {
            path: path.to_path_buf(),
            header,
            entries,
            mmap,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &IndexHeader {
        &self.header
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// The cell lattice this record was built against.
    pub fn grid(&self) -> Grid {
        Grid::new(self.header.bbox_min, self.header.cell_size)
    }

    /// Binary search over the sorted entry directory.
    pub fn find_entry(&self, z_key: u64) -> Option<&IndexEntry> {
        self.entries
            .binary_search_by_key(&z_key, |e| e.z_key)
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Decodes one cell's trajectory ids straight from the mapped file.
    /// Bounds were validated at open, so this cannot run off the mapping.
    pub fn ids_for(&self, entry: &IndexEntry) -> Vec<TrajectoryId> {
        let off = IndexHeader::LEN
            + IndexEntry::LEN * self.entries.len()
            + 4 * entry.start_index as usize;
        let bytes = &self.mmap[off..off + 4 * entry.count as usize];
        bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes(b.try_into().unwrap()))
            .collect()
    }

    /// Resident footprint: header plus entry directory. Ids stay on disk.
    pub fn memory_bytes(&self) -> usize {
        IndexHeader::LEN + IndexEntry::LEN * self.entries.len()
    }
}
