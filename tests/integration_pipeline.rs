//! Integration tests for the pipeline module.
//!
//! These tests verify end-to-end pipeline behavior including:
//! - Grouping byte-identical copies
//! - Removal keeping one image per group, recorded before anything is deleted
//! - File names that are not valid UTF-8
//! - Empty directories, corrupt files and nonexistent paths
//! - Settings rejected before any work starts

use image::{GrayImage, Luma};
use phash_dedup::core::pipeline::Pipeline;
use phash_dedup::core::remover::DuplicateRemover;
use phash_dedup::core::reporter::save_groups;
use phash_dedup::error::{CompareError, ScanError};
use phash_dedup::events::null_sender;
use phash_dedup::DedupError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn read_saved(path: &Path) -> Vec<Vec<String>> {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn lossy(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

fn write_gradient(path: &Path) {
    GrayImage::from_fn(96, 96, |x, y| Luma([((x * 2 + y) % 256) as u8]))
        .save(path)
        .unwrap();
}

fn write_checkerboard(path: &Path, cell: u32) {
    GrayImage::from_fn(96, 96, |x, y| {
        Luma([if (x / cell + y / cell) % 2 == 0 { 20 } else { 235 }])
    })
    .save(path)
    .unwrap();
}

/// Two byte-identical gradients and one unrelated checkerboard
fn populate(dir: &TempDir) {
    write_gradient(&dir.path().join("a.png"));
    fs::copy(dir.path().join("a.png"), dir.path().join("b.png")).unwrap();
    write_checkerboard(&dir.path().join("c.png"), 16);
}

#[test]
fn identical_copies_form_one_group() {
    let temp_dir = TempDir::new().unwrap();
    populate(&temp_dir);

    for radius in [0, 1, 4] {
        let result = Pipeline::builder()
            .images_dir(temp_dir.path())
            .radius(radius)
            .seed(7)
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(result.total_images, 3);
        assert_eq!(result.groups.len(), 1, "radius {}", radius);
        assert_eq!(
            result.groups[0].images,
            vec![temp_dir.path().join("a.png"), temp_dir.path().join("b.png")]
        );
        assert_eq!(result.duplicate_count(), 1);
    }
}

#[test]
fn removal_keeps_one_copy_and_leaves_unrelated_images() {
    let temp_dir = TempDir::new().unwrap();
    populate(&temp_dir);

    let result = Pipeline::builder()
        .images_dir(temp_dir.path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    let report = DuplicateRemover::new().remove(&result.groups);

    // Equal sizes: the first listed copy is kept
    assert!(temp_dir.path().join("a.png").exists());
    assert!(!temp_dir.path().join("b.png").exists());
    assert!(temp_dir.path().join("c.png").exists());
    assert_eq!(report.removed.len(), 1);
    assert!(report.failures.is_empty());
}

#[test]
fn saved_groups_match_pipeline_output() {
    let temp_dir = TempDir::new().unwrap();
    let images = temp_dir.path().join("images");
    fs::create_dir(&images).unwrap();
    write_gradient(&images.join("one.png"));
    fs::copy(images.join("one.png"), images.join("two.png")).unwrap();

    let result = Pipeline::builder()
        .images_dir(&images)
        .build()
        .unwrap()
        .run()
        .unwrap();

    let out = temp_dir.path().join("dups.json");
    save_groups(&out, &result.groups).unwrap();

    assert_eq!(
        read_saved(&out),
        vec![vec![lossy(images.join("one.png")), lossy(images.join("two.png"))]]
    );
}

#[test]
fn recorded_removal_saves_whole_groups_before_deleting() {
    let temp_dir = TempDir::new().unwrap();
    let images = temp_dir.path().join("images");
    fs::create_dir(&images).unwrap();
    write_gradient(&images.join("a.png"));
    fs::copy(images.join("a.png"), images.join("b.png")).unwrap();
    write_checkerboard(&images.join("c.png"), 16);

    let result = Pipeline::builder()
        .images_dir(&images)
        .build()
        .unwrap()
        .run()
        .unwrap();

    let out = temp_dir.path().join("dups.json");
    let report = DuplicateRemover::new()
        .remove_recorded(&out, &result.groups, &null_sender())
        .unwrap();

    // The record lists the kept copy as well as the removed one
    assert_eq!(
        read_saved(&out),
        vec![vec![lossy(images.join("a.png")), lossy(images.join("b.png"))]]
    );
    assert!(images.join("a.png").exists());
    assert!(!images.join("b.png").exists());
    assert!(images.join("c.png").exists());
    assert_eq!(report.removed, vec![images.join("b.png")]);
}

#[test]
fn unwritable_record_leaves_every_image() {
    let temp_dir = TempDir::new().unwrap();
    populate(&temp_dir);

    let result = Pipeline::builder()
        .images_dir(temp_dir.path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    let out = temp_dir.path().join("no-such-dir").join("dups.json");
    let outcome = DuplicateRemover::new().remove_recorded(&out, &result.groups, &null_sender());

    assert!(outcome.is_err());
    for name in ["a.png", "b.png", "c.png"] {
        assert!(temp_dir.path().join(name).exists(), "{} was removed", name);
    }
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_file_names_are_grouped_and_saved() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp_dir = TempDir::new().unwrap();
    let images = temp_dir.path().join("images");
    fs::create_dir(&images).unwrap();
    write_gradient(&images.join("a.png"));
    let odd = images.join(OsStr::from_bytes(b"caf\xe9.png"));
    fs::copy(images.join("a.png"), &odd).unwrap();

    let result = Pipeline::builder()
        .images_dir(&images)
        .build()
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(result.groups.len(), 1);

    let out = temp_dir.path().join("dups.json");
    DuplicateRemover::new()
        .dry_run(true)
        .remove_recorded(&out, &result.groups, &null_sender())
        .unwrap();

    let saved = read_saved(&out);
    assert_eq!(saved.len(), 1);
    assert!(saved[0].contains(&lossy(images.join("a.png"))));
    assert!(saved[0].iter().any(|p| p.ends_with("caf\u{FFFD}.png")));
    assert!(odd.exists());
}

#[test]
fn pipeline_handles_empty_directory() {
    let temp_dir = TempDir::new().unwrap();

    let result = Pipeline::builder()
        .images_dir(temp_dir.path())
        .radius(3)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(result.total_images, 0);
    assert_eq!(result.groups.len(), 0);
}

#[test]
fn pipeline_handles_corrupt_file_gracefully() {
    let temp_dir = TempDir::new().unwrap();
    populate(&temp_dir);
    fs::write(temp_dir.path().join("corrupt.jpg"), b"this is not a valid image file").unwrap();

    let result = Pipeline::builder()
        .images_dir(temp_dir.path())
        .radius(2)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(result.total_images, 4);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.groups.len(), 1);
}

#[test]
fn non_image_files_are_not_listed() {
    let temp_dir = TempDir::new().unwrap();
    populate(&temp_dir);
    fs::write(temp_dir.path().join("notes.txt"), b"hello").unwrap();

    let result = Pipeline::builder()
        .images_dir(temp_dir.path())
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(result.total_images, 3);
}

#[test]
fn subdirectories_need_recursive() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    write_gradient(&temp_dir.path().join("top.png"));
    fs::copy(temp_dir.path().join("top.png"), nested.join("copy.png")).unwrap();

    let flat = Pipeline::builder()
        .images_dir(temp_dir.path())
        .build()
        .unwrap()
        .run()
        .unwrap();
    assert!(flat.groups.is_empty());

    let deep = Pipeline::builder()
        .images_dir(temp_dir.path())
        .recursive(true)
        .build()
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(deep.groups.len(), 1);
}

#[test]
fn negative_radius_is_rejected_before_scanning() {
    let result = Pipeline::builder()
        .images_dir("/nonexistent/path/that/does/not/exist")
        .radius(-2)
        .build();

    assert!(matches!(
        result,
        Err(DedupError::Compare(CompareError::InvalidRadius { value: -2 }))
    ));
}

#[test]
fn pipeline_reports_nonexistent_path() {
    let pipeline = Pipeline::builder()
        .images_dir("/nonexistent/path/that/does/not/exist")
        .build()
        .unwrap();

    assert!(matches!(
        pipeline.run(),
        Err(DedupError::Scan(ScanError::DirectoryNotFound { .. }))
    ));
}
