use crate::engine::build::bbox::scan_bbox;
use crate::engine::errors::BuildError;
use crate::test_helpers::factory::Factory;

#[test]
fn test_bbox_spans_all_valid_samples() {
    let store = Factory::memory_store()
        .with_shard(
            0,
            0,
            vec![
                Factory::sample().with_position([1.0, 2.0, 3.0]).create(),
                Factory::sample()
                    .with_id(2)
                    .with_position([-4.0, 8.0, 0.0])
                    .create(),
            ],
        )
        .create();

    let (min, max) = scan_bbox(&store, 0.0).unwrap();
    assert_eq!(min, [-4.0, 2.0, 0.0]);
    assert_eq!(max, [1.0, 8.0, 3.0]);
}

#[test]
fn test_margin_expands_every_axis() {
    let store = Factory::memory_store()
        .with_shard(
            0,
            0,
            vec![Factory::sample().with_position([0.0, 0.0, 0.0]).create()],
        )
        .create();

    let (min, max) = scan_bbox(&store, 2.5).unwrap();
    assert_eq!(min, [-2.5, -2.5, -2.5]);
    assert_eq!(max, [2.5, 2.5, 2.5]);
}

#[test]
fn test_nan_samples_are_ignored() {
    let store = Factory::memory_store()
        .with_shard(
            0,
            0,
            vec![
                Factory::sample().with_position([1.0, 1.0, 1.0]).create(),
                Factory::sample()
                    .with_id(2)
                    .with_position([f32::NAN, 100.0, 100.0])
                    .create(),
            ],
        )
        .create();

    let (min, max) = scan_bbox(&store, 0.0).unwrap();
    assert_eq!(min, [1.0, 1.0, 1.0]);
    assert_eq!(max, [1.0, 1.0, 1.0]);
}

#[test]
fn test_empty_dataset_is_rejected() {
    let store = Factory::memory_store().with_shard(0, 0, vec![]).create();
    assert!(matches!(
        scan_bbox(&store, 0.0),
        Err(BuildError::InvalidConfig(_))
    ));
}
