pub mod cell;
pub mod index;

pub use cell::grid::Grid;
pub use cell::morton::{decode_z, encode_z};
pub use index::header::IndexHeader;
pub use index::reader::IndexHandle;
pub use index::record::{IndexEntry, IndexRecord};
