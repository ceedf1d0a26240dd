use rand::Rng;

use crate::engine::types::{TimeStep, TrajectoryId, TrajectorySample};

pub struct SampleFactory {
    trajectory_id: TrajectoryId,
    time_step: TimeStep,
    position: [f32; 3],
}

impl SampleFactory {
    pub fn new() -> Self {
        Self {
            trajectory_id: 1,
            time_step: 0,
            position: [0.5, 0.5, 0.5],
        }
    }

    pub fn with_id(mut self, trajectory_id: TrajectoryId) -> Self {
        self.trajectory_id = trajectory_id;
        self
    }

    pub fn with_time_step(mut self, time_step: TimeStep) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn create(self) -> TrajectorySample {
        TrajectorySample::new(self.trajectory_id, self.time_step, self.position)
    }

    /// `count` samples at this factory's time step, ids ascending from the
    /// factory id, positions scattered uniformly inside the box.
    pub fn create_scattered(
        self,
        count: usize,
        bbox_min: [f32; 3],
        bbox_max: [f32; 3],
    ) -> Vec<TrajectorySample> {
        let mut rng = rand::thread_rng();
        (0..count)
            .map(|i| {
                let position = [
                    rng.gen_range(bbox_min[0]..bbox_max[0]),
                    rng.gen_range(bbox_min[1]..bbox_max[1]),
                    rng.gen_range(bbox_min[2]..bbox_max[2]),
                ];
                TrajectorySample::new(self.trajectory_id + i as u32, self.time_step, position)
            })
            .collect()
    }
}
