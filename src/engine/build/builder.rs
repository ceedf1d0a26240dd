use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{error, info};

use crate::engine::build::bbox::scan_bbox;
use crate::engine::build::config::{BboxMode, BuildConfig};
use crate::engine::build::time_step_builder::{TimeStepStats, build_record};
use crate::engine::core::Grid;
use crate::engine::core::index::layout;
use crate::engine::core::index::writer::write_record;
use crate::engine::errors::{BuildError, StoreError};
use crate::engine::store::{ShardInfo, TrajectoryStore};
use crate::engine::types::{TimeStep, TrajectorySample};

const LOG_TARGET: &str = "trajhash::build";

/// What one builder run produced and skipped. Nothing is dropped silently:
/// every rejected sample lands in one of the counters.
#[derive(Debug, Default, Clone)]
pub struct BuildReport {
    pub files_written: usize,
    pub samples_indexed: usize,
    pub skipped_nan: usize,
    pub skipped_out_of_bounds: usize,
    pub duplicate_ids: usize,
    pub time_steps: Vec<TimeStep>,
}

impl BuildReport {
    fn absorb(&mut self, time_step: TimeStep, stats: TimeStepStats) {
        self.files_written += 1;
        self.samples_indexed += stats.indexed;
        self.skipped_nan += stats.skipped_nan;
        self.skipped_out_of_bounds += stats.skipped_out_of_bounds;
        self.duplicate_ids += stats.duplicate_ids;
        self.time_steps.push(time_step);
    }
}

/// Batched parallel index builder.
///
/// One shard's samples are resident at a time; the time steps inside that
/// batch are built and written concurrently on blocking workers. Peak memory
/// is one shard batch plus the in-flight records, not the dataset.
pub struct IndexBuilder {
    config: BuildConfig,
}

impl IndexBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self, store: Arc<dyn TrajectoryStore>) -> Result<BuildReport, BuildError> {
        self.config.validate()?;

        let (bbox_min, bbox_max) = match self.config.bbox {
            BboxMode::Explicit { min, max } => (min, max),
            BboxMode::Auto { margin } => {
                let store = Arc::clone(&store);
                tokio::task::spawn_blocking(move || scan_bbox(store.as_ref(), margin))
                    .await
                    .map_err(|_| BuildError::WorkerLost)??
            }
        };

        let (t_lo, t_hi) = match self.config.time_step_range {
            Some(range) => range,
            None => store.time_range()?,
        };

        let grid = Grid::new(bbox_min, self.config.cell_size);
        let shards = store.shards()?;
        let workers = self.config.worker_count();
        info!(
            target: LOG_TARGET,
            shards = shards.len(),
            t_lo,
            t_hi,
            workers,
            cell_size = self.config.cell_size,
            output_dir = %self.config.output_dir.display(),
            "Starting index build"
        );

        let mut report = BuildReport::default();
        for shard in shards {
            if shard.t_hi < t_lo || shard.t_lo > t_hi {
                continue;
            }
            let buckets = Self::bucket_shard(&store, shard, t_lo, t_hi).await?;
            self.build_batch(&mut report, buckets, grid, bbox_max, workers)
                .await?;
            // buckets and records are gone before the next shard loads
        }

        report.time_steps.sort_unstable();
        info!(
            target: LOG_TARGET,
            files = report.files_written,
            indexed = report.samples_indexed,
            skipped_nan = report.skipped_nan,
            skipped_out_of_bounds = report.skipped_out_of_bounds,
            duplicates = report.duplicate_ids,
            "Index build finished"
        );
        Ok(report)
    }

    /// Reads one shard and groups its in-range samples by time step. Every
    /// covered step gets a bucket even when empty, so range loads stay dense.
    async fn bucket_shard(
        store: &Arc<dyn TrajectoryStore>,
        shard: ShardInfo,
        t_lo: TimeStep,
        t_hi: TimeStep,
    ) -> Result<BTreeMap<TimeStep, Vec<TrajectorySample>>, BuildError> {
        let store = Arc::clone(store);
        tokio::task::spawn_blocking(move || -> Result<_, StoreError> {
            let mut buckets: BTreeMap<TimeStep, Vec<TrajectorySample>> = BTreeMap::new();
            for t in shard.t_lo.max(t_lo)..=shard.t_hi.min(t_hi) {
                buckets.insert(t, Vec::new());
            }
            for sample in store.read_shard(&shard)? {
                if sample.time_step < t_lo || sample.time_step > t_hi {
                    continue;
                }
                buckets.entry(sample.time_step).or_default().push(sample);
            }
            Ok(buckets)
        })
        .await
        .map_err(|_| BuildError::WorkerLost)?
        .map_err(BuildError::Store)
    }

    /// Builds and writes one batch's time steps, at most `workers` in flight.
    /// The first failure wins; files written before it stay on disk.
    async fn build_batch(
        &self,
        report: &mut BuildReport,
        buckets: BTreeMap<TimeStep, Vec<TrajectorySample>>,
        grid: Grid,
        bbox_max: [f32; 3],
        workers: usize,
    ) -> Result<(), BuildError> {
        let mut join_set: JoinSet<Result<(TimeStep, TimeStepStats), BuildError>> = JoinSet::new();
        let mut pending = buckets.into_iter();
        let mut first_err: Option<BuildError> = None;

        loop {
            while first_err.is_none() && join_set.len() < workers {
                let Some((time_step, samples)) = pending.next() else {
                    break;
                };
                let path =
                    layout::index_file(&self.config.output_dir, self.config.cell_size, time_step);
                join_set.spawn_blocking(move || {
                    let (record, stats) = build_record(time_step, &samples, &grid, bbox_max);
                    write_record(&record, &path)?;
                    Ok((time_step, stats))
                });
            }
            match join_set.join_next().await {
                None => break,
                Some(Ok(Ok((time_step, stats)))) => report.absorb(time_step, stats),
                Some(Ok(Err(e))) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
                Some(Err(_)) => {
                    if first_err.is_none() {
                        first_err = Some(BuildError::WorkerLost);
                    }
                }
            }
        }

        if let Some(e) = first_err {
            error!(target: LOG_TARGET, error = %e, "Index build failed");
            return Err(e);
        }
        Ok(())
    }
}
