// Copyright (c) sfbuild contributors
// SPDX-License-Identifier: Apache-2.0

use std::fs;

use super::*;

#[test]
fn untracked_path_reports_untracked() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("f.txt");
    fs::write(&file, b"hello").unwrap();
    let cache = SymbiCache::new();
    assert_eq!(cache.get_status(&file, "consumer"), Status::Untracked);
}

#[test]
fn same_after_update_with_no_change() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("f.txt");
    fs::write(&file, b"hello").unwrap();
    let mut cache = SymbiCache::new();
    cache.update(&file, "consumer");
    assert_eq!(cache.get_status(&file, "consumer"), Status::Same);
}

#[test]
fn changed_after_content_differs_from_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("f.txt");
    fs::write(&file, b"hello").unwrap();
    let mut cache = SymbiCache::new();
    cache.update(&file, "consumer");
    fs::write(&file, b"goodbye").unwrap();
    assert_eq!(cache.get_status(&file, "consumer"), Status::Changed);
}

#[test]
fn status_is_tracked_independently_per_consumer() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("f.txt");
    fs::write(&file, b"hello").unwrap();
    let mut cache = SymbiCache::new();
    cache.update(&file, "synth");
    assert_eq!(cache.get_status(&file, "synth"), Status::Same);
    assert_eq!(cache.get_status(&file, "place"), Status::Untracked);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("f.txt");
    fs::write(&file, b"hello").unwrap();
    let mut cache = SymbiCache::new();
    cache.update(&file, "synth");
    cache.update(&file, TARGET_CONSUMER);

    let cache_path = dir.path().join(".symbicache");
    cache.save(&cache_path).unwrap();

    let loaded = SymbiCache::load(&cache_path);
    assert_eq!(loaded.get_status(&file, "synth"), Status::Same);
    assert_eq!(loaded.get_status(&file, TARGET_CONSUMER), Status::Same);
}

#[test]
fn load_of_missing_file_starts_empty_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cache = SymbiCache::load(&dir.path().join("nonexistent"));
    assert_eq!(cache.get_status(Path::new("/anything"), "consumer"), Status::Untracked);
}
