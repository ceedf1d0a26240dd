use crate::engine::store::MemoryStore;
use crate::engine::types::{TimeStep, TrajectorySample};

pub struct MemoryStoreFactory {
    shards: Vec<(TimeStep, TimeStep, Vec<TrajectorySample>)>,
    fail_fetch: bool,
}

impl MemoryStoreFactory {
    pub fn new() -> Self {
        Self {
            shards: Vec::new(),
            fail_fetch: false,
        }
    }

    pub fn with_shard(
        mut self,
        t_lo: TimeStep,
        t_hi: TimeStep,
        samples: Vec<TrajectorySample>,
    ) -> Self {
        self.shards.push((t_lo, t_hi, samples));
        self
    }

    pub fn with_failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn create(self) -> MemoryStore {
        let mut store = MemoryStore::new();
        for (t_lo, t_hi, samples) in self.shards {
            store.add_shard(t_lo, t_hi, samples);
        }
        if self.fail_fetch {
            store = store.with_failing_fetch();
        }
        store
    }
}
