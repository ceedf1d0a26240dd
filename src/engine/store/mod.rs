pub mod memory;
pub mod shard_files;

#[cfg(test)]
mod shard_files_test;

pub use memory::MemoryStore;

use std::collections::HashMap;

use crate::engine::errors::StoreError;
use crate::engine::types::{TimeStep, TrajectoryId, TrajectorySample};

/// Identity and time coverage of one shard. A shard spans the contiguous
/// inclusive interval `[t_lo, t_hi]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardInfo {
    pub seq: usize,
    pub t_lo: TimeStep,
    pub t_hi: TimeStep,
}

/// Samples of the requested trajectories keyed by trajectory id, each list
/// ascending by time step.
pub type FetchedSamples = HashMap<TrajectoryId, Vec<(TimeStep, [f32; 3])>>;

/// Pull interface over the external trajectory sample store.
///
/// The concrete shard byte format is opaque to this crate; implementations
/// decode it and hand back plain sample records. Invalid (NaN) samples pass
/// through untouched so the consumer can count what it skips.
pub trait TrajectoryStore: Send + Sync {
    /// All shards, sorted ascending by `t_lo`.
    fn shards(&self) -> Result<Vec<ShardInfo>, StoreError>;

    /// Global `(min, max)` time step across the dataset.
    fn time_range(&self) -> Result<(TimeStep, TimeStep), StoreError>;

    /// Every sample of one shard.
    fn read_shard(&self, shard: &ShardInfo) -> Result<Vec<TrajectorySample>, StoreError>;

    /// Samples of the given trajectories within `[t_lo, t_hi]` inclusive.
    fn fetch_trajectory_samples(
        &self,
        ids: &[TrajectoryId],
        t_lo: TimeStep,
        t_hi: TimeStep,
    ) -> Result<FetchedSamples, StoreError>;
}
