pub use super::factories::{
    BuildConfigFactory, MemoryStoreFactory, RecordFactory, SampleFactory,
};

pub struct Factory;

impl Factory {
    pub fn sample() -> SampleFactory {
        SampleFactory::new()
    }

    pub fn record() -> RecordFactory {
        RecordFactory::new()
    }

    pub fn memory_store() -> MemoryStoreFactory {
        MemoryStoreFactory::new()
    }

    pub fn build_config() -> BuildConfigFactory {
        BuildConfigFactory::new()
    }
}
