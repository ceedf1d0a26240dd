use std::io::Write;

use crate::engine::errors::CodecError;
use crate::engine::types::TimeStep;

/// Fixed 64-byte header of a `TSHT` index file, little-endian on disk.
///
/// Field order: magic, version, time_step, cell_size, bbox_min, bbox_max,
/// n_entries, n_ids, four reserved words (written as zero, ignored on read).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexHeader {
    pub time_step: TimeStep,
    pub cell_size: f32,
    pub bbox_min: [f32; 3],
    pub bbox_max: [f32; 3],
    pub n_entries: u32,
    pub n_ids: u32,
}

impl IndexHeader {
    pub const MAGIC: u32 = 0x5453_4854;
    pub const VERSION: u32 = 1;
    pub const LEN: usize = 64;

    pub fn write_to<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        w.write_all(&Self::MAGIC.to_le_bytes())?;
        w.write_all(&Self::VERSION.to_le_bytes())?;
        w.write_all(&self.time_step.to_le_bytes())?;
        w.write_all(&self.cell_size.to_le_bytes())?;
        for c in self.bbox_min {
            w.write_all(&c.to_le_bytes())?;
        }
        for c in self.bbox_max {
            w.write_all(&c.to_le_bytes())?;
        }
        w.write_all(&self.n_entries.to_le_bytes())?;
        w.write_all(&self.n_ids.to_le_bytes())?;
        w.write_all(&[0u8; 16])?;
        Ok(())
    }

    /// Parses and validates the header at the front of `buf`.
    ///
    /// A byte-swapped (big-endian) writer fails the magic comparison, which
    /// covers the endianness check.
    pub fn read_from(buf: &[u8]) -> Result<Self, CodecError> {
        if buf.len() < Self::LEN {
            return Err(CodecError::Format(format!(
                "file too small for header: {} bytes",
                buf.len()
            )));
        }
        let u32_at = |o: usize| u32::from_le_bytes(buf[o..o + 4].try_into().unwrap());
        let f32_at = |o: usize| f32::from_le_bytes(buf[o..o + 4].try_into().unwrap());

        let magic = u32_at(0);
        if magic != Self::MAGIC {
            return Err(CodecError::Format(format!("bad magic 0x{magic:08x}")));
        }
        let version = u32_at(4);
        if version != Self::VERSION {
            return Err(CodecError::Format(format!("unsupported version {version}")));
        }

        Ok(Self {
            time_step: u32_at(8),
            cell_size: f32_at(12),
            bbox_min: [f32_at(16), f32_at(20), f32_at(24)],
            bbox_max: [f32_at(28), f32_at(32), f32_at(36)],
            n_entries: u32_at(40),
            n_ids: u32_at(44),
        })
    }
}
