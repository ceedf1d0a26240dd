use crate::engine::core::Grid;

#[test]
fn test_world_to_cell_at_origin_bbox() {
    let grid = Grid::new([0.0, 0.0, 0.0], 10.0);

    assert_eq!(grid.cell_of([5.0, 5.0, 5.0]), (0, 0, 0));
    assert_eq!(grid.cell_of([15.0, 25.0, 35.0]), (1, 2, 3));
    assert_eq!(grid.cell_of([9.999, 0.0, 0.0]), (0, 0, 0));
    assert_eq!(grid.cell_of([10.0, 0.0, 0.0]), (1, 0, 0));
}

#[test]
fn test_world_to_cell_with_offset_bbox() {
    let grid = Grid::new([-50.0, 100.0, 0.5], 2.5);

    assert_eq!(grid.cell_of([-50.0, 100.0, 0.5]), (0, 0, 0));
    assert_eq!(grid.cell_of([-45.0, 105.0, 5.5]), (2, 2, 2));
}

#[test]
fn test_positions_below_bbox_map_to_negative_cells() {
    let grid = Grid::new([0.0, 0.0, 0.0], 10.0);

    let cell = grid.cell_of([-0.1, 5.0, 5.0]);
    assert_eq!(cell, (-1, 0, 0));
    assert!(!Grid::cell_in_lattice(cell));
}

#[test]
fn test_range_for_sphere_expands_by_ceil() {
    let grid = Grid::new([0.0, 0.0, 0.0], 10.0);

    // radius 20 over cell_size 10 reaches exactly 2 cells out
    let (lo, hi) = grid.range_for_sphere([5.0, 5.0, 5.0], 20.0);
    assert_eq!(lo, (-2, -2, -2));
    assert_eq!(hi, (2, 2, 2));

    // radius 11 rounds up to 2 cells as well
    let (lo, hi) = grid.range_for_sphere([5.0, 5.0, 5.0], 11.0);
    assert_eq!(lo, (-2, -2, -2));
    assert_eq!(hi, (2, 2, 2));
}

#[test]
fn test_clamped_range_drops_cells_outside_bbox() {
    let grid = Grid::new([0.0, 0.0, 0.0], 10.0);
    let bbox_max = [40.0, 40.0, 40.0];

    let (lo, hi) = grid.clamped_range_for_sphere([5.0, 5.0, 5.0], 20.0, bbox_max);
    assert_eq!(lo, (0, 0, 0));
    assert_eq!(hi, (2, 2, 2));

    let (lo, hi) = grid.clamped_range_for_sphere([35.0, 35.0, 35.0], 20.0, bbox_max);
    assert_eq!(lo, (1, 1, 1));
    assert_eq!(hi, (4, 4, 4));
}

#[test]
fn test_clamped_range_is_empty_far_outside_bbox() {
    let grid = Grid::new([0.0, 0.0, 0.0], 10.0);
    let bbox_max = [40.0, 40.0, 40.0];

    let (lo, hi) = grid.clamped_range_for_sphere([-100.0, 5.0, 5.0], 10.0, bbox_max);
    // inverted on x: no cells enumerate
    assert!(lo.0 > hi.0);
}
