use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::engine::errors::{QueryError, StoreError};
use crate::engine::query::cancel::CancelToken;
use crate::engine::query::candidates::{Gather, gather};
use crate::engine::query::result::{
    DualRadiusResult, QueryPhase, QueryResult, QuerySummary, TrajectoryHit,
};
use crate::engine::registry::IndexRegistry;
use crate::engine::store::{FetchedSamples, TrajectoryStore};
use crate::engine::types::{TimeStep, TrajectoryId, distance};

const LOG_TARGET: &str = "trajhash::query";

/// Farthest a fetched position can honestly be from the query point if the
/// index cell that produced the candidate was fresh: the gather box reaches
/// `ceil(r / cell) + 1` cells from the center cell on every axis.
fn stale_bound(gather_radius: f32, cell_size: f32) -> f32 {
    let reach = (gather_radius / cell_size).ceil() + 1.0;
    3f32.sqrt() * reach * cell_size
}

struct QueryRun {
    family: &'static str,
    phase: QueryPhase,
}

impl QueryRun {
    fn start(family: &'static str) -> Self {
        Self {
            family,
            phase: QueryPhase::Idle,
        }
    }

    fn enter(&mut self, phase: QueryPhase) {
        self.phase = phase;
        debug!(target: LOG_TARGET, family = self.family, phase = ?phase, "Query phase");
    }

    fn finish(&mut self, hits: usize) {
        self.phase = QueryPhase::Complete;
        debug!(target: LOG_TARGET, family = self.family, hits, "Query complete");
    }

    fn fail(&mut self, error: &QueryError) {
        self.phase = QueryPhase::Failed;
        debug!(target: LOG_TARGET, family = self.family, error = %error, "Query failed");
    }
}

/// Two-phase query engine over loaded index records and the sample store.
///
/// Phase 1 gathers candidate ids from the per-time-step cell directories;
/// phase 2 fetches the candidates' true samples and refines by exact
/// Euclidean distance. Missing index records contribute zero candidates and a
/// summary count; only store-level fetch failures and contract violations
/// abort a query.
///
/// Cloning is cheap: both ends are shared handles.
#[derive(Clone)]
pub struct QueryEngine {
    registry: Arc<IndexRegistry>,
    store: Arc<dyn TrajectoryStore>,
}

impl QueryEngine {
    pub fn new(registry: Arc<IndexRegistry>, store: Arc<dyn TrajectoryStore>) -> Self {
        Self { registry, store }
    }

    fn ensure(cond: bool, msg: impl Into<String>) -> Result<(), QueryError> {
        if cond {
            Ok(())
        } else {
            Err(QueryError::Contract(msg.into()))
        }
    }

    fn ensure_live(cancel: &CancelToken) -> Result<(), QueryError> {
        if cancel.is_cancelled() {
            Err(QueryError::Cancelled)
        } else {
            Ok(())
        }
    }

    async fn fetch(
        &self,
        ids: &[TrajectoryId],
        t_lo: TimeStep,
        t_hi: TimeStep,
    ) -> Result<FetchedSamples, QueryError> {
        if ids.is_empty() {
            return Ok(FetchedSamples::default());
        }
        let store = Arc::clone(&self.store);
        let ids = ids.to_vec();
        tokio::task::spawn_blocking(move || store.fetch_trajectory_samples(&ids, t_lo, t_hi))
            .await
            .map_err(|_| QueryError::Fetch(StoreError::FetchFailed("fetch worker aborted".into())))?
            .map_err(QueryError::Fetch)
    }

    fn absorb_gather(summary: &mut QuerySummary, g: &Gather, time_step: TimeStep) {
        summary.time_steps_queried += 1;
        summary.cells_scanned += g.cells_scanned;
        summary.cells_hit += g.cells_hit;
        if !g.loaded {
            summary.missing_time_steps += 1;
            warn!(
                target: LOG_TARGET,
                time_step, "No index record for time step; it contributes no candidates"
            );
        }
    }

    fn warn_stale(summary: &QuerySummary) {
        if summary.stale_candidates > 0 {
            warn!(
                target: LOG_TARGET,
                stale = summary.stale_candidates,
                "Fetched positions disagree with the index that produced them; index may be stale"
            );
        }
    }

    /// Family A: all trajectories within `radius` of `p` at one time step.
    pub async fn query_radius(
        &self,
        p: [f32; 3],
        radius: f32,
        cell_size: f32,
        time_step: TimeStep,
        cancel: &CancelToken,
    ) -> Result<QueryResult, QueryError> {
        let mut run = QueryRun::start("radius");
        let result = self
            .radius_inner(p, radius, cell_size, time_step, cancel, &mut run)
            .await;
        match &result {
            Ok(r) => run.finish(r.hits.len()),
            Err(e) => run.fail(e),
        }
        result
    }

    async fn radius_inner(
        &self,
        p: [f32; 3],
        radius: f32,
        cell_size: f32,
        time_step: TimeStep,
        cancel: &CancelToken,
        run: &mut QueryRun,
    ) -> Result<QueryResult, QueryError> {
        Self::ensure(radius >= 0.0 && radius.is_finite(), "radius must be >= 0")?;

        run.enter(QueryPhase::Gathering);
        Self::ensure_live(cancel)?;
        let mut summary = QuerySummary::default();
        let g = gather(&self.registry, cell_size, time_step, p, radius);
        Self::absorb_gather(&mut summary, &g, time_step);
        summary.candidates = g.ids.len();

        run.enter(QueryPhase::Fetching);
        Self::ensure_live(cancel)?;
        let fetched = self.fetch(&g.ids, time_step, time_step).await?;

        run.enter(QueryPhase::Refining);
        Self::ensure_live(cancel)?;
        let bound = stale_bound(radius, cell_size);
        let mut hits = Vec::new();
        let by_id: BTreeMap<_, _> = fetched.into_iter().collect();
        for (trajectory_id, samples) in by_id {
            let mut kept = Vec::new();
            for (t, position) in samples {
                let d = distance(position, p);
                if d > bound {
                    summary.stale_candidates += 1;
                }
                if d <= radius {
                    kept.push((t, position));
                }
            }
            if !kept.is_empty() {
                hits.push(TrajectoryHit {
                    trajectory_id,
                    samples: kept,
                });
            }
        }
        Self::warn_stale(&summary);
        Ok(QueryResult { hits, summary })
    }

    /// Family A-dual: partition survivors into `d <= r_in` and
    /// `r_in < d <= r_out`.
    pub async fn query_dual_radius(
        &self,
        p: [f32; 3],
        r_in: f32,
        r_out: f32,
        cell_size: f32,
        time_step: TimeStep,
        cancel: &CancelToken,
    ) -> Result<DualRadiusResult, QueryError> {
        let mut run = QueryRun::start("dual_radius");
        let result = self
            .dual_radius_inner(p, r_in, r_out, cell_size, time_step, cancel, &mut run)
            .await;
        match &result {
            Ok(r) => run.finish(r.inner.len() + r.outer_only.len()),
            Err(e) => run.fail(e),
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn dual_radius_inner(
        &self,
        p: [f32; 3],
        r_in: f32,
        r_out: f32,
        cell_size: f32,
        time_step: TimeStep,
        cancel: &CancelToken,
        run: &mut QueryRun,
    ) -> Result<DualRadiusResult, QueryError> {
        Self::ensure(
            r_in >= 0.0 && r_in.is_finite() && r_out.is_finite(),
            "inner radius must be >= 0",
        )?;
        Self::ensure(r_in <= r_out, "inner radius must not exceed outer radius")?;

        run.enter(QueryPhase::Gathering);
        Self::ensure_live(cancel)?;
        let mut summary = QuerySummary::default();
        let g = gather(&self.registry, cell_size, time_step, p, r_out);
        Self::absorb_gather(&mut summary, &g, time_step);
        summary.candidates = g.ids.len();

        run.enter(QueryPhase::Fetching);
        Self::ensure_live(cancel)?;
        let fetched = self.fetch(&g.ids, time_step, time_step).await?;

        run.enter(QueryPhase::Refining);
        Self::ensure_live(cancel)?;
        let bound = stale_bound(r_out, cell_size);
        let mut inner = Vec::new();
        let mut outer_only = Vec::new();
        let by_id: BTreeMap<_, _> = fetched.into_iter().collect();
        for (trajectory_id, samples) in by_id {
            let mut inner_samples = Vec::new();
            let mut outer_samples = Vec::new();
            for (t, position) in samples {
                let d = distance(position, p);
                if d > bound {
                    summary.stale_candidates += 1;
                }
                if d <= r_in {
                    inner_samples.push((t, position));
                } else if d <= r_out {
                    outer_samples.push((t, position));
                }
            }
            // both bands satisfied means the trajectory reports as inner only
            if !inner_samples.is_empty() {
                inner.push(TrajectoryHit {
                    trajectory_id,
                    samples: inner_samples,
                });
            } else if !outer_samples.is_empty() {
                outer_only.push(TrajectoryHit {
                    trajectory_id,
                    samples: outer_samples,
                });
            }
        }
        Self::warn_stale(&summary);
        Ok(DualRadiusResult {
            inner,
            outer_only,
            summary,
        })
    }

    /// Family B: all trajectories with at least one in-radius sample across
    /// `[t_lo, t_hi]`; every in-radius sample is reported.
    pub async fn query_radius_range(
        &self,
        p: [f32; 3],
        radius: f32,
        cell_size: f32,
        t_lo: TimeStep,
        t_hi: TimeStep,
        cancel: &CancelToken,
    ) -> Result<QueryResult, QueryError> {
        let mut run = QueryRun::start("radius_range");
        let result = self
            .radius_range_inner(p, radius, cell_size, t_lo, t_hi, cancel, &mut run)
            .await;
        match &result {
            Ok(r) => run.finish(r.hits.len()),
            Err(e) => run.fail(e),
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn radius_range_inner(
        &self,
        p: [f32; 3],
        radius: f32,
        cell_size: f32,
        t_lo: TimeStep,
        t_hi: TimeStep,
        cancel: &CancelToken,
        run: &mut QueryRun,
    ) -> Result<QueryResult, QueryError> {
        Self::ensure(radius >= 0.0 && radius.is_finite(), "radius must be >= 0")?;
        Self::ensure(t_lo <= t_hi, "time range is inverted")?;

        run.enter(QueryPhase::Gathering);
        let mut summary = QuerySummary::default();
        let mut candidate_ids: Vec<TrajectoryId> = Vec::new();
        for t in t_lo..=t_hi {
            Self::ensure_live(cancel)?;
            let g = gather(&self.registry, cell_size, t, p, radius);
            Self::absorb_gather(&mut summary, &g, t);
            candidate_ids.extend(g.ids);
        }
        candidate_ids.sort_unstable();
        candidate_ids.dedup();
        summary.candidates = candidate_ids.len();

        run.enter(QueryPhase::Fetching);
        Self::ensure_live(cancel)?;
        let fetched = self.fetch(&candidate_ids, t_lo, t_hi).await?;

        run.enter(QueryPhase::Refining);
        Self::ensure_live(cancel)?;
        let bound = stale_bound(radius, cell_size);
        let mut hits = Vec::new();
        let by_id: BTreeMap<_, _> = fetched.into_iter().collect();
        for (trajectory_id, samples) in by_id {
            let mut kept = Vec::new();
            for (t, position) in samples {
                let d = distance(position, p);
                if d > bound {
                    summary.stale_candidates += 1;
                }
                if d <= radius {
                    kept.push((t, position));
                }
            }
            if !kept.is_empty() {
                hits.push(TrajectoryHit {
                    trajectory_id,
                    samples: kept,
                });
            }
        }
        Self::warn_stale(&summary);
        Ok(QueryResult { hits, summary })
    }

    /// Family C: follow one trajectory and report every other trajectory that
    /// comes within `radius` of it, over the engagement interval between its
    /// first and last in-radius time steps (inclusive, re-entries preserved).
    pub async fn query_trajectory_range(
        &self,
        query_id: TrajectoryId,
        radius: f32,
        cell_size: f32,
        t_lo: TimeStep,
        t_hi: TimeStep,
        cancel: &CancelToken,
    ) -> Result<QueryResult, QueryError> {
        let mut run = QueryRun::start("trajectory_range");
        let result = self
            .trajectory_range_inner(query_id, radius, cell_size, t_lo, t_hi, cancel, &mut run)
            .await;
        match &result {
            Ok(r) => run.finish(r.hits.len()),
            Err(e) => run.fail(e),
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn trajectory_range_inner(
        &self,
        query_id: TrajectoryId,
        radius: f32,
        cell_size: f32,
        t_lo: TimeStep,
        t_hi: TimeStep,
        cancel: &CancelToken,
        run: &mut QueryRun,
    ) -> Result<QueryResult, QueryError> {
        Self::ensure(radius >= 0.0 && radius.is_finite(), "radius must be >= 0")?;
        Self::ensure(t_lo <= t_hi, "time range is inverted")?;

        // phase 0: the query trajectory's own path over the range
        let own = self.fetch(&[query_id], t_lo, t_hi).await?;
        let query_path: BTreeMap<TimeStep, [f32; 3]> = match own.get(&query_id) {
            Some(samples) if !samples.is_empty() => samples.iter().copied().collect(),
            _ => return Err(QueryError::TrajectoryNotFound(query_id)),
        };

        run.enter(QueryPhase::Gathering);
        let mut summary = QuerySummary::default();
        let mut candidate_ids: Vec<TrajectoryId> = Vec::new();
        for (&t, &p_t) in &query_path {
            Self::ensure_live(cancel)?;
            let g = gather(&self.registry, cell_size, t, p_t, radius);
            Self::absorb_gather(&mut summary, &g, t);
            candidate_ids.extend(g.ids);
        }
        candidate_ids.sort_unstable();
        candidate_ids.dedup();
        // following itself is not a result
        candidate_ids.retain(|&id| id != query_id);
        summary.candidates = candidate_ids.len();

        run.enter(QueryPhase::Fetching);
        Self::ensure_live(cancel)?;
        let fetched = self.fetch(&candidate_ids, t_lo, t_hi).await?;

        run.enter(QueryPhase::Refining);
        Self::ensure_live(cancel)?;
        let mut hits = Vec::new();
        let by_id: BTreeMap<_, _> = fetched.into_iter().collect();
        for (trajectory_id, samples) in by_id {
            let mut enter: Option<TimeStep> = None;
            let mut exit: Option<TimeStep> = None;
            for &(t, position) in &samples {
                let Some(&q_pos) = query_path.get(&t) else {
                    continue;
                };
                if distance(position, q_pos) <= radius {
                    enter.get_or_insert(t);
                    exit = Some(t);
                }
            }
            let (Some(enter), Some(exit)) = (enter, exit) else {
                continue;
            };
            // the whole engagement interval, out-of-radius samples included
            let kept: Vec<(TimeStep, [f32; 3])> = samples
                .into_iter()
                .filter(|&(t, _)| t >= enter && t <= exit)
                .collect();
            hits.push(TrajectoryHit {
                trajectory_id,
                samples: kept,
            });
        }
        Ok(QueryResult { hits, summary })
    }
}

/// Callback-style variants: the same queries spawned onto the runtime, with
/// the result delivered through a single completion callback.
impl QueryEngine {
    pub fn query_radius_async(
        &self,
        p: [f32; 3],
        radius: f32,
        cell_size: f32,
        time_step: TimeStep,
        cancel: CancelToken,
        on_complete: impl FnOnce(Result<QueryResult, QueryError>) + Send + 'static,
    ) {
        let engine = self.clone();
        tokio::spawn(async move {
            let result = engine
                .query_radius(p, radius, cell_size, time_step, &cancel)
                .await;
            on_complete(result);
        });
    }

    pub fn query_dual_radius_async(
        &self,
        p: [f32; 3],
        r_in: f32,
        r_out: f32,
        cell_size: f32,
        time_step: TimeStep,
        cancel: CancelToken,
        on_complete: impl FnOnce(Result<DualRadiusResult, QueryError>) + Send + 'static,
    ) {
        let engine = self.clone();
        tokio::spawn(async move {
            let result = engine
                .query_dual_radius(p, r_in, r_out, cell_size, time_step, &cancel)
                .await;
            on_complete(result);
        });
    }

    pub fn query_radius_range_async(
        &self,
        p: [f32; 3],
        radius: f32,
        cell_size: f32,
        t_lo: TimeStep,
        t_hi: TimeStep,
        cancel: CancelToken,
        on_complete: impl FnOnce(Result<QueryResult, QueryError>) + Send + 'static,
    ) {
        let engine = self.clone();
        tokio::spawn(async move {
            let result = engine
                .query_radius_range(p, radius, cell_size, t_lo, t_hi, &cancel)
                .await;
            on_complete(result);
        });
    }

    pub fn query_trajectory_range_async(
        &self,
        query_id: TrajectoryId,
        radius: f32,
        cell_size: f32,
        t_lo: TimeStep,
        t_hi: TimeStep,
        cancel: CancelToken,
        on_complete: impl FnOnce(Result<QueryResult, QueryError>) + Send + 'static,
    ) {
        let engine = self.clone();
        tokio::spawn(async move {
            let result = engine
                .query_trajectory_range(query_id, radius, cell_size, t_lo, t_hi, &cancel)
                .await;
            on_complete(result);
        });
    }
}
