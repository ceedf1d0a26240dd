use std::io;
use thiserror::Error;

/// Failures raised while encoding or decoding `TSHT` index files.
///
/// Format errors (bad magic, version, sizes) are never retried by the codec;
/// the caller decides whether a broken file is fatal.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("format error: {0}")]
    Format(String),
}

/// Failures surfaced by a trajectory sample store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("corrupt shard data: {0}")]
    Corrupt(String),

    #[error("dataset contains no shards")]
    EmptyDataset,

    #[error("sample fetch refused: {0}")]
    FetchFailed(String),
}

/// Failures raised by the index builder. The first failing time step wins;
/// files written before it stay on disk.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid build config: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("index codec failed: {0}")]
    Codec(#[from] CodecError),

    #[error("shard store failed: {0}")]
    Store(#[from] StoreError),

    #[error("build worker aborted")]
    WorkerLost,
}

/// Failures raised by the index registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no index record for cell_size={cell_size} time_step={time_step}")]
    NotFound { cell_size: f32, time_step: u32 },

    #[error("a build is already in progress")]
    Busy,

    #[error("index codec failed: {0}")]
    Codec(#[from] CodecError),

    #[error("build failed: {0}")]
    Build(#[from] BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failures that abort a whole query.
///
/// Missing index records for individual time steps are not errors; they are
/// counted in the query summary instead.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("contract violation: {0}")]
    Contract(String),

    #[error("sample fetch failed: {0}")]
    Fetch(StoreError),

    #[error("query trajectory {0} has no samples in range")]
    TrajectoryNotFound(u32),

    #[error("query cancelled")]
    Cancelled,
}
