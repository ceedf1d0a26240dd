use crate::engine::build::config::BboxMode;
use crate::engine::errors::BuildError;
use crate::test_helpers::factory::Factory;

#[test]
fn test_default_config_is_valid() {
    let config = Factory::build_config().create();
    config.validate().unwrap();
    assert!(matches!(config.bbox, BboxMode::Auto { .. }));
}

#[test]
fn test_rejects_nonpositive_cell_size() {
    for cell_size in [0.0, -1.0, f32::NAN] {
        let config = Factory::build_config().with_cell_size(cell_size).create();
        assert!(matches!(
            config.validate(),
            Err(BuildError::InvalidConfig(_))
        ));
    }
}

#[test]
fn test_rejects_negative_margin() {
    let config = Factory::build_config().with_margin(-0.5).create();
    assert!(matches!(
        config.validate(),
        Err(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn test_rejects_inverted_explicit_bbox() {
    let config = Factory::build_config()
        .with_explicit_bbox([0.0, 0.0, 10.0], [10.0, 10.0, 5.0])
        .create();
    assert!(matches!(
        config.validate(),
        Err(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn test_rejects_inverted_time_range() {
    let config = Factory::build_config().with_range(9, 3).create();
    assert!(matches!(
        config.validate(),
        Err(BuildError::InvalidConfig(_))
    ));
}

#[test]
fn test_worker_count_is_never_zero() {
    let config = Factory::build_config().with_workers(0).create();
    assert_eq!(config.worker_count(), 1);
}
