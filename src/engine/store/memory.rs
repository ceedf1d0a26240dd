use std::collections::HashSet;

use crate::engine::errors::StoreError;
use crate::engine::store::{FetchedSamples, ShardInfo, TrajectoryStore};
use crate::engine::types::{TimeStep, TrajectoryId, TrajectorySample};

/// One pre-decoded shard held in memory.
#[derive(Debug, Clone)]
pub struct MemoryShard {
    pub t_lo: TimeStep,
    pub t_hi: TimeStep,
    pub samples: Vec<TrajectorySample>,
}

/// In-memory [`TrajectoryStore`] over pre-decoded shards.
///
/// Backs tests and embedders that already hold their samples. Shard order and
/// time coverage behave exactly like a directory of shard files; `fail_fetch`
/// lets query tests exercise the store-refused path.
#[derive(Debug, Default)]
pub struct MemoryStore {
    shards: Vec<MemoryShard>,
    fail_fetch: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shard covering `[t_lo, t_hi]`; shards are kept sorted by `t_lo`.
    pub fn add_shard(&mut self, t_lo: TimeStep, t_hi: TimeStep, samples: Vec<TrajectorySample>) {
        self.shards.push(MemoryShard { t_lo, t_hi, samples });
        self.shards.sort_by_key(|s| s.t_lo);
    }

    /// Every subsequent `fetch_trajectory_samples` fails with `FetchFailed`.
    pub fn with_failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }
}

impl TrajectoryStore for MemoryStore {
    fn shards(&self) -> Result<Vec<ShardInfo>, StoreError> {
        Ok(self
            .shards
            .iter()
            .enumerate()
            .map(|(seq, s)| ShardInfo {
                seq,
                t_lo: s.t_lo,
                t_hi: s.t_hi,
            })
            .collect())
    }

    fn time_range(&self) -> Result<(TimeStep, TimeStep), StoreError> {
        let lo = self.shards.iter().map(|s| s.t_lo).min();
        let hi = self.shards.iter().map(|s| s.t_hi).max();
        match (lo, hi) {
            (Some(lo), Some(hi)) => Ok((lo, hi)),
            _ => Err(StoreError::EmptyDataset),
        }
    }

    fn read_shard(&self, shard: &ShardInfo) -> Result<Vec<TrajectorySample>, StoreError> {
        self.shards
            .get(shard.seq)
            .map(|s| s.samples.clone())
            .ok_or_else(|| StoreError::Corrupt(format!("unknown shard seq {}", shard.seq)))
    }

    fn fetch_trajectory_samples(
        &self,
        ids: &[TrajectoryId],
        t_lo: TimeStep,
        t_hi: TimeStep,
    ) -> Result<FetchedSamples, StoreError> {
        if self.fail_fetch {
            return Err(StoreError::FetchFailed("injected fetch failure".into()));
        }
        let wanted: HashSet<TrajectoryId> = ids.iter().copied().collect();
        let mut out = FetchedSamples::new();
        for shard in &self.shards {
            if shard.t_hi < t_lo || shard.t_lo > t_hi {
                continue;
            }
            for s in &shard.samples {
                if s.time_step < t_lo || s.time_step > t_hi {
                    continue;
                }
                if wanted.contains(&s.trajectory_id) {
                    out.entry(s.trajectory_id)
                        .or_default()
                        .push((s.time_step, s.position));
                }
            }
        }
        for samples in out.values_mut() {
            samples.sort_by_key(|(t, _)| *t);
        }
        Ok(out)
    }
}
