use tracing::info;

use crate::engine::errors::BuildError;
use crate::engine::store::TrajectoryStore;

/// Axis-wise bounds of every valid sample position in the store, expanded by
/// `margin` on all sides. One full pass over the shard stream.
pub fn scan_bbox(
    store: &dyn TrajectoryStore,
    margin: f32,
) -> Result<([f32; 3], [f32; 3]), BuildError> {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    let mut seen: usize = 0;

    for shard in store.shards()? {
        for sample in store.read_shard(&shard)? {
            if !sample.is_valid() {
                continue;
            }
            for axis in 0..3 {
                min[axis] = min[axis].min(sample.position[axis]);
                max[axis] = max[axis].max(sample.position[axis]);
            }
            seen += 1;
        }
    }

    if seen == 0 {
        return Err(BuildError::InvalidConfig(
            "auto bbox: dataset has no valid samples".into(),
        ));
    }

    for axis in 0..3 {
        min[axis] -= margin;
        max[axis] += margin;
    }

    info!(
        target: "trajhash::build",
        samples = seen,
        ?min,
        ?max,
        "Derived bounding box from shard scan"
    );
    Ok((min, max))
}
