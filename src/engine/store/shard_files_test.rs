use std::fs::File;

use tempfile::tempdir;

use crate::engine::store::shard_files::{parse_time_step, sorted_shard_files};

#[test]
fn test_parse_time_step_variants() {
    assert_eq!(parse_time_step("traj_0005.shard"), Some(5));
    assert_eq!(parse_time_step("shard-12.bin"), Some(12));
    assert_eq!(parse_time_step("007.dat"), Some(7));
    assert_eq!(parse_time_step("42"), Some(42));
    assert_eq!(parse_time_step("readme.txt"), None);
    assert_eq!(parse_time_step("shard_final.bin"), None);
}

#[test]
fn test_enumeration_sorts_by_parsed_time_step() {
    let tmp = tempdir().unwrap();
    for name in ["traj_0010.shard", "traj_0002.shard", "traj_0007.shard"] {
        File::create(tmp.path().join(name)).unwrap();
    }

    let files = sorted_shard_files(tmp.path()).unwrap();
    let steps: Vec<u32> = files.iter().map(|(t, _)| *t).collect();
    assert_eq!(steps, vec![2, 7, 10]);
}

#[test]
fn test_enumeration_skips_unparseable_names() {
    let tmp = tempdir().unwrap();
    File::create(tmp.path().join("traj_0001.shard")).unwrap();
    File::create(tmp.path().join("notes.txt")).unwrap();

    let files = sorted_shard_files(tmp.path()).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].0, 1);
}
