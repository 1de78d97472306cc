use std::fs;

use tempfile::TempDir;
use tracker_client::write_atomically;

#[test]
fn creates_missing_parent_dirs() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("nested").join("config.ron");

    write_atomically(&target, "hello").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
}

#[test]
fn replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("config.ron");

    write_atomically(&target, "first").unwrap();
    write_atomically(&target, "second").unwrap();
    assert_eq!(fs::read_to_string(&target).unwrap(), "second");

    let leftovers: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn parent_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    fs::write(&blocker, "x").unwrap();

    let result = write_atomically(&blocker.join("config.ron"), "data");
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}
