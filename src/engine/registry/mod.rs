pub mod index_registry;


pub use index_registry::{IndexRegistry, MemoryStats, create_registry};
