use std::path::Path;

use crate::engine::core::index::layout;

#[test]
fn test_cell_size_label_is_stable() {
    assert_eq!(layout::cell_size_label(10.0), "10.000");
    assert_eq!(layout::cell_size_label(0.5), "0.500");
    assert_eq!(layout::cell_size_label(2.125), "2.125");
}

#[test]
fn test_index_file_path_shape() {
    let path = layout::index_file(Path::new("/data/out"), 10.0, 42);
    assert_eq!(path, Path::new("/data/out/cell_10.000/index_42.bin"));
}

#[test]
fn test_labels_roundtrip_through_parsers() {
    for cell_size in [0.25f32, 1.0, 10.0, 123.5] {
        let dir_name = format!("cell_{}", layout::cell_size_label(cell_size));
        let parsed = layout::parse_cell_size_dir(&dir_name).unwrap();
        assert!((parsed - cell_size).abs() < 1e-3);
    }

    assert_eq!(layout::parse_index_file("index_7.bin"), Some(7));
    assert_eq!(layout::parse_index_file("index_7.tmp"), None);
    assert_eq!(layout::parse_index_file("other_7.bin"), None);
    assert_eq!(layout::parse_cell_size_dir("logs"), None);
}
