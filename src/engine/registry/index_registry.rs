use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::engine::build::{BuildConfig, IndexBuilder};
use crate::engine::core::IndexHandle;
use crate::engine::core::index::layout;
use crate::engine::errors::RegistryError;
use crate::engine::store::TrajectoryStore;
use crate::engine::types::TimeStep;

const LOG_TARGET: &str = "trajhash::registry";

/// Milli-quantized cell size. Lookups probe the adjacent quanta, so the
/// effective comparison tolerance is 1e-3 absolute.
fn quantize(cell_size: f32) -> i64 {
    (cell_size as f64 * 1000.0).round() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct IndexKey {
    cell_millis: i64,
    time_step: TimeStep,
}

/// Resident footprint of the registry's open records. Ids stay on disk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    pub records: usize,
    pub bytes: usize,
}

/// Process-wide map of opened index records, keyed by `(cell_size, time_step)`.
///
/// One reader-writer lock guards the map; it is never held across file I/O.
/// Open records are immutable and shared freely across threads. The atomic
/// `building` flag gates concurrent background builds.
pub struct IndexRegistry {
    records: RwLock<HashMap<IndexKey, Arc<IndexHandle>>>,
    building: AtomicBool,
}

pub fn create_registry() -> Arc<IndexRegistry> {
    Arc::new(IndexRegistry::new())
}

impl Default for IndexRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            building: AtomicBool::new(false),
        }
    }

    pub fn get(&self, cell_size: f32, time_step: TimeStep) -> Option<Arc<IndexHandle>> {
        let records = self.records.read();
        let q = quantize(cell_size);
        for dq in [0i64, -1, 1] {
            let key = IndexKey {
                cell_millis: q + dq,
                time_step,
            };
            if let Some(handle) = records.get(&key) {
                return Some(Arc::clone(handle));
            }
        }
        None
    }

    pub fn is_loaded(&self, cell_size: f32, time_step: TimeStep) -> bool {
        self.get(cell_size, time_step).is_some()
    }

    /// Every `(cell_size, time_step)` currently resident, sorted.
    pub fn enumerate(&self) -> Vec<(f32, TimeStep)> {
        let mut out: Vec<(f32, TimeStep)> = self
            .records
            .read()
            .keys()
            .map(|k| (k.cell_millis as f32 / 1000.0, k.time_step))
            .collect();
        out.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        out
    }

    pub fn memory_stats(&self) -> MemoryStats {
        let records = self.records.read();
        MemoryStats {
            records: records.len(),
            bytes: records.values().map(|h| h.memory_bytes()).sum(),
        }
    }

    fn insert(&self, cell_size: f32, time_step: TimeStep, handle: Arc<IndexHandle>) {
        let key = IndexKey {
            cell_millis: quantize(cell_size),
            time_step,
        };
        self.records.write().insert(key, handle);
    }

    /// Opens a single record from disk, or returns the resident one.
    pub fn load_one(
        &self,
        dir: &Path,
        cell_size: f32,
        time_step: TimeStep,
    ) -> Result<Arc<IndexHandle>, RegistryError> {
        if let Some(handle) = self.get(cell_size, time_step) {
            return Ok(handle);
        }
        let path = layout::index_file(dir, cell_size, time_step);
        if !path.exists() {
            return Err(RegistryError::NotFound {
                cell_size,
                time_step,
            });
        }
        let handle = Arc::new(IndexHandle::open(&path)?);
        self.insert(cell_size, time_step, Arc::clone(&handle));
        Ok(handle)
    }

    /// Opens every record in `[t_lo, t_hi]` and returns how many are resident
    /// for the range afterwards. With `auto_create`, missing files trigger one
    /// builder run over the whole range before opening; without it they are
    /// skipped with a warning. Codec failures on files that exist are returned.
    pub async fn load_range(
        &self,
        store: &Arc<dyn TrajectoryStore>,
        dir: &Path,
        cell_size: f32,
        t_lo: TimeStep,
        t_hi: TimeStep,
        auto_create: bool,
    ) -> Result<usize, RegistryError> {
        let any_missing = (t_lo..=t_hi).any(|t| {
            !self.is_loaded(cell_size, t) && !layout::index_file(dir, cell_size, t).exists()
        });
        if any_missing && auto_create {
            info!(
                target: LOG_TARGET,
                cell_size, t_lo, t_hi, "Index files missing; invoking builder"
            );
            let config =
                BuildConfig::new(cell_size, dir.to_path_buf()).with_time_step_range(t_lo, t_hi);
            IndexBuilder::new(config).run(Arc::clone(store)).await?;
        }

        let mut loaded = 0usize;
        for t in t_lo..=t_hi {
            if self.is_loaded(cell_size, t) {
                loaded += 1;
                continue;
            }
            let path = layout::index_file(dir, cell_size, t);
            if !path.exists() {
                warn!(
                    target: LOG_TARGET,
                    cell_size,
                    time_step = t,
                    "Index file missing; skipping"
                );
                continue;
            }
            let handle = Arc::new(IndexHandle::open(&path)?);
            self.insert(cell_size, t, handle);
            loaded += 1;
        }
        info!(
            target: LOG_TARGET,
            cell_size, t_lo, t_hi, loaded, "Loaded index range"
        );
        Ok(loaded)
    }

    pub fn is_building(&self) -> bool {
        self.building.load(Ordering::Acquire)
    }

    /// Builds and loads `[t_lo, t_hi]` on a background task, delivering the
    /// result through `on_complete`. Only one build may be in flight; a second
    /// call fails fast with `Busy`.
    pub fn create_async(
        self: Arc<Self>,
        store: Arc<dyn TrajectoryStore>,
        dir: PathBuf,
        cell_size: f32,
        t_lo: TimeStep,
        t_hi: TimeStep,
        on_complete: impl FnOnce(Result<usize, RegistryError>) + Send + 'static,
    ) -> Result<(), RegistryError> {
        if self
            .building
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(RegistryError::Busy);
        }
        tokio::spawn(async move {
            let result = self
                .load_range(&store, &dir, cell_size, t_lo, t_hi, true)
                .await;
            self.building.store(false, Ordering::Release);
            on_complete(result);
        });
        Ok(())
    }

    /// Drops every record with the given cell size; returns how many.
    pub fn unload(&self, cell_size: f32) -> usize {
        let q = quantize(cell_size);
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|key, _| (key.cell_millis - q).abs() > 1);
        let removed = before - records.len();
        info!(target: LOG_TARGET, cell_size, removed, "Unloaded index records");
        removed
    }

    pub fn unload_all(&self) {
        self.records.write().clear();
        info!(target: LOG_TARGET, "Unloaded all index records");
    }

    /// Index files discoverable under `dir`, including partial builds:
    /// per cell size, the sorted time steps that have a file on disk.
    pub fn available(&self, dir: &Path) -> Result<Vec<(f32, Vec<TimeStep>)>, RegistryError> {
        let mut out = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(cell_size) = layout::parse_cell_size_dir(&name.to_string_lossy()) else {
                continue;
            };
            let mut steps = Vec::new();
            for file in fs::read_dir(entry.path())? {
                let file = file?;
                if let Some(t) = layout::parse_index_file(&file.file_name().to_string_lossy()) {
                    steps.push(t);
                }
            }
            steps.sort_unstable();
            out.push((cell_size, steps));
        }
        out.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(out)
    }
}
