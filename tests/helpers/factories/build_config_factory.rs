use std::path::PathBuf;

use crate::engine::build::{BboxMode, BuildConfig};
use crate::engine::types::TimeStep;

pub struct BuildConfigFactory {
    cell_size: f32,
    bbox: BboxMode,
    output_dir: PathBuf,
    time_step_range: Option<(TimeStep, TimeStep)>,
    workers: Option<usize>,
}

impl BuildConfigFactory {
    pub fn new() -> Self {
        Self {
            cell_size: 1.0,
            bbox: BboxMode::Auto { margin: 1.0 },
            output_dir: PathBuf::from("index-out"),
            time_step_range: None,
            workers: None,
        }
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.bbox = BboxMode::Auto { margin };
        self
    }

    pub fn with_explicit_bbox(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.bbox = BboxMode::Explicit { min, max };
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_range(mut self, t_lo: TimeStep, t_hi: TimeStep) -> Self {
        self.time_step_range = Some((t_lo, t_hi));
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn create(self) -> BuildConfig {
        let mut config = BuildConfig::new(self.cell_size, self.output_dir);
        config.bbox = self.bbox;
        config.time_step_range = self.time_step_range;
        config.workers = self.workers;
        config
    }
}
