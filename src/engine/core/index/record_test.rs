use crate::engine::core::index::record::IndexEntry;
use crate::test_helpers::factory::Factory;

#[test]
fn test_entry_roundtrip_is_sixteen_bytes() {
    let entry = IndexEntry {
        z_key: 0xdead_beef_cafe,
        start_index: 42,
        count: 7,
    };
    let mut buf = Vec::new();
    entry.write_to(&mut buf).unwrap();

    assert_eq!(buf.len(), IndexEntry::LEN);
    assert_eq!(IndexEntry::read_from(&buf), entry);
}

#[test]
fn test_valid_record_passes_validation() {
    let record = Factory::record()
        .with_cell((0, 0, 0), vec![1, 2])
        .with_cell((1, 0, 0), vec![3])
        .with_cell((0, 1, 0), vec![4, 5, 6])
        .create();

    record.validate().unwrap();
    assert_eq!(record.header.n_entries, 3);
    assert_eq!(record.header.n_ids, 6);
}

#[test]
fn test_validation_rejects_unsorted_entries() {
    let mut record = Factory::record()
        .with_cell((0, 0, 0), vec![1])
        .with_cell((1, 0, 0), vec![2])
        .create();
    record.entries.swap(0, 1);
    record.entries[0].start_index = 0;
    record.entries[1].start_index = 1;

    assert!(record.validate().is_err());
}

#[test]
fn test_validation_rejects_count_mismatch() {
    let mut record = Factory::record().with_cell((0, 0, 0), vec![1, 2]).create();
    record.header.n_ids = 3;

    assert!(record.validate().is_err());
}

#[test]
fn test_validation_rejects_gap_in_id_layout() {
    let mut record = Factory::record()
        .with_cell((0, 0, 0), vec![1])
        .with_cell((1, 0, 0), vec![2])
        .create();
    record.entries[1].start_index = 5;

    assert!(record.validate().is_err());
}

#[test]
fn test_validation_rejects_nonpositive_cell_size() {
    let mut record = Factory::record().with_cell((0, 0, 0), vec![1]).create();
    record.header.cell_size = 0.0;

    assert!(record.validate().is_err());
}

#[test]
fn test_empty_record_is_valid() {
    let record = Factory::record().create();
    record.validate().unwrap();
    assert_eq!(record.file_len(), 64);
}
