use std::path::PathBuf;

use crate::engine::errors::BuildError;
use crate::engine::types::TimeStep;
use crate::shared::config::config;

/// How the builder obtains the indexing bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BboxMode {
    /// One extra pass over the shards computes the bounds of all valid
    /// samples, expanded by `margin` on every axis.
    Auto { margin: f32 },
    Explicit { min: [f32; 3], max: [f32; 3] },
}

/// Build configuration for one cell size.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub cell_size: f32,
    pub bbox: BboxMode,
    pub output_dir: PathBuf,
    /// Inclusive; derived from the store when absent.
    pub time_step_range: Option<(TimeStep, TimeStep)>,
    /// Concurrent per-time-step builds; `engine.build_workers` when absent.
    pub workers: Option<usize>,
}

impl BuildConfig {
    pub fn new(cell_size: f32, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            cell_size,
            bbox: BboxMode::Auto {
                margin: config().engine.default_bbox_margin,
            },
            output_dir: output_dir.into(),
            time_step_range: None,
            workers: None,
        }
    }

    pub fn with_explicit_bbox(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.bbox = BboxMode::Explicit { min, max };
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.bbox = BboxMode::Auto { margin };
        self
    }

    pub fn with_time_step_range(mut self, t_lo: TimeStep, t_hi: TimeStep) -> Self {
        self.time_step_range = Some((t_lo, t_hi));
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or(config().engine.build_workers).max(1)
    }

    pub fn validate(&self) -> Result<(), BuildError> {
        if !(self.cell_size > 0.0) || !self.cell_size.is_finite() {
            return Err(BuildError::InvalidConfig(format!(
                "cell_size must be positive and finite, got {}",
                self.cell_size
            )));
        }
        match self.bbox {
            BboxMode::Auto { margin } => {
                if margin < 0.0 || !margin.is_finite() {
                    return Err(BuildError::InvalidConfig(format!(
                        "bbox_margin must be non-negative and finite, got {margin}"
                    )));
                }
            }
            BboxMode::Explicit { min, max } => {
                for axis in 0..3 {
                    if !min[axis].is_finite() || !max[axis].is_finite() {
                        return Err(BuildError::InvalidConfig(
                            "explicit bbox must be finite".into(),
                        ));
                    }
                    if min[axis] > max[axis] {
                        return Err(BuildError::InvalidConfig(format!(
                            "bbox_min exceeds bbox_max on axis {axis}"
                        )));
                    }
                }
            }
        }
        if let Some((t_lo, t_hi)) = self.time_step_range {
            if t_lo > t_hi {
                return Err(BuildError::InvalidConfig(format!(
                    "time_step_range is inverted: [{t_lo}, {t_hi}]"
                )));
            }
        }
        Ok(())
    }
}
