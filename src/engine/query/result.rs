use crate::engine::types::{TimeStep, TrajectoryId};

/// Phase progression of one query run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Idle,
    Gathering,
    Fetching,
    Refining,
    Complete,
    Failed,
}

/// Per-query accounting. Skipped time steps and suspect candidates are
/// counted here rather than dropped silently.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuerySummary {
    pub time_steps_queried: usize,
    pub missing_time_steps: usize,
    pub candidates: usize,
    pub cells_scanned: usize,
    pub cells_hit: usize,
    pub stale_candidates: usize,
}

/// One surviving trajectory and its reported samples, ascending by time step.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryHit {
    pub trajectory_id: TrajectoryId,
    pub samples: Vec<(TimeStep, [f32; 3])>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct QueryResult {
    pub hits: Vec<TrajectoryHit>,
    pub summary: QuerySummary,
}

/// Family A-dual outcome: survivors split into the inner ball and the shell
/// between the two radii. A trajectory never appears in both lists.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DualRadiusResult {
    pub inner: Vec<TrajectoryHit>,
    pub outer_only: Vec<TrajectoryHit>,
    pub summary: QuerySummary,
}
