//! Asset import and listing against a real directory tree.

use assert_fs::prelude::*;
use predicates::prelude::predicate;
use texforge_core::assets::{AssetKind, AssetManager, ImportOutcome};
use texforge_core::AssetError;

fn incoming(tmp: &assert_fs::TempDir) -> assert_fs::fixture::ChildPath {
    let dir = tmp.child("incoming");
    dir.child("nested").create_dir_all().expect("mkdir");
    dir.child("Inter.ttf").write_binary(&[0u8; 64]).expect("write ttf");
    dir.child("Serif.OTF").write_binary(&[0u8; 32]).expect("write otf");
    dir.child("notes.txt").write_str("not a font").expect("write txt");
    dir.child("nested").child("Deep.ttf").write_binary(&[0u8; 8]).expect("write nested");
    dir
}

// ---------------------------------------------------------------------------
// 1. Importing a directory
// ---------------------------------------------------------------------------

#[test]
fn import_dir_copies_recognized_files_only() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let source = incoming(&tmp);
    let project = tmp.child("project");
    let manager = AssetManager::new(project.path());

    let outcomes = manager
        .import_dir(AssetKind::Font, source.path(), false)
        .expect("import_dir");
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| matches!(o, ImportOutcome::Copied { .. })));

    let fonts = project.child("assets").child("fonts");
    fonts.child("Inter.ttf").assert(predicate::path::is_file());
    fonts.child("Serif.OTF").assert(predicate::path::is_file());
    fonts.child("notes.txt").assert(predicate::path::missing());
    fonts.child("Deep.ttf").assert(predicate::path::missing());
    project.child("assets").child("images").assert(predicate::path::is_dir());
}

#[test]
fn reimport_keeps_files_unless_overwriting() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let logo = tmp.child("logo.png");
    logo.write_str("v1").expect("write v1");
    let manager = AssetManager::new(tmp.child("project").path());

    manager.import(AssetKind::Image, logo.path(), false).expect("first import");
    logo.write_str("v2").expect("write v2");

    let kept = manager.import(AssetKind::Image, logo.path(), false).expect("second import");
    assert!(matches!(kept, ImportOutcome::Kept { .. }));
    tmp.child("project/assets/images/logo.png")
        .assert(predicate::str::contains("v1"));

    let copied = manager.import(AssetKind::Image, logo.path(), true).expect("overwrite");
    assert!(matches!(copied, ImportOutcome::Copied { .. }));
    tmp.child("project/assets/images/logo.png")
        .assert(predicate::str::contains("v2"));
}

#[test]
fn unexpected_extension_is_still_copied() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let odd = tmp.child("scan.tiff");
    odd.write_binary(&[1u8; 4]).expect("write");
    let manager = AssetManager::new(tmp.child("project").path());

    let outcome = manager.import(AssetKind::Image, odd.path(), false).expect("import");
    assert!(outcome.dest().ends_with("assets/images/scan.tiff"));
    tmp.child("project/assets/images/scan.tiff")
        .assert(predicate::path::is_file());
}

// ---------------------------------------------------------------------------
// 2. Errors
// ---------------------------------------------------------------------------

#[test]
fn import_dir_on_a_file_is_rejected() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let file = tmp.child("Inter.ttf");
    file.write_binary(&[0u8; 4]).expect("write");
    let manager = AssetManager::new(tmp.path());

    let err = manager.import_dir(AssetKind::Font, file.path(), false).unwrap_err();
    assert!(matches!(err, AssetError::NotADirectory { .. }), "got: {err}");
    tmp.child("assets").assert(predicate::path::missing());
}

// ---------------------------------------------------------------------------
// 3. Listing
// ---------------------------------------------------------------------------

#[test]
fn listing_reflects_imports() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    let source = incoming(&tmp);
    let logo = tmp.child("logo.png");
    logo.write_binary(&[0u8; 10]).expect("write logo");
    let manager = AssetManager::new(tmp.child("project").path());

    manager.import_dir(AssetKind::Font, source.path(), false).expect("fonts");
    manager.import(AssetKind::Image, logo.path(), false).expect("logo");

    let listed: Vec<(AssetKind, String, u64, String)> = manager
        .list()
        .expect("list")
        .into_iter()
        .map(|e| (e.kind, e.name, e.size_bytes, e.extension))
        .collect();
    assert_eq!(
        listed,
        vec![
            (AssetKind::Font, "Inter.ttf".to_string(), 64, "TTF".to_string()),
            (AssetKind::Font, "Serif.OTF".to_string(), 32, "OTF".to_string()),
            (AssetKind::Image, "logo.png".to_string(), 10, "PNG".to_string()),
        ]
    );
}
