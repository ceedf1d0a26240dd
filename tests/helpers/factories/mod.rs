pub mod build_config_factory;
pub mod memory_store_factory;
pub mod record_factory;
pub mod sample_factory;

pub use build_config_factory::BuildConfigFactory;
pub use memory_store_factory::MemoryStoreFactory;
pub use record_factory::RecordFactory;
pub use sample_factory::SampleFactory;
