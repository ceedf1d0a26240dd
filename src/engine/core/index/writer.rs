use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::engine::core::index::record::IndexRecord;
use crate::engine::errors::CodecError;

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serializes a validated [`IndexRecord`] to its on-disk `TSHT` layout.
///
/// The bytes go to a sibling `.tmp` file first and are renamed into place, so
/// a crash mid-write never leaves a partial file under the final name.
pub fn write_record(record: &IndexRecord, path: &Path) -> Result<(), CodecError> {
    record.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    {
        let file = File::create(&tmp).map_err(|e| {
            error!(target: "trajhash::index", error = %e, path = %tmp.display(), "Failed to create index file");
            CodecError::Io(e)
        })?;
        let mut writer = BufWriter::new(file);
        record.header.write_to(&mut writer)?;
        for entry in &record.entries {
            entry.write_to(&mut writer)?;
        }
        for id in &record.ids {
            writer.write_all(&id.to_le_bytes())?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;

    debug!(
        target: "trajhash::index",
        path = %path.display(),
        time_step = record.header.time_step,
        entries = record.entries.len(),
        ids = record.ids.len(),
        "Wrote index record"
    );
    Ok(())
}
