pub mod cancel;
pub mod candidates;
pub mod engine;
pub mod result;


pub use cancel::CancelToken;
pub use engine::QueryEngine;
pub use result::{DualRadiusResult, QueryPhase, QueryResult, QuerySummary, TrajectoryHit};
