use std::fs;
use std::path::{Path, PathBuf};

use smart_rename::rename::STAGING_DIR_NAME;
use smart_rename::{smart_rename, Pattern, SmartRenameError, SmartRenameOptions, TransformOptions};
use tempfile::tempdir;

fn remove(patterns: &[&str]) -> SmartRenameOptions {
    SmartRenameOptions::new(TransformOptions::new(
        patterns.iter().map(|p| Pattern::literal(*p)).collect(),
    ))
}

/// Create a file (and parents) with the given content.
fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write file");
}

fn names(dir: &Path) -> Vec<String> {
    let mut v: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    v.sort();
    v
}

/// Canonical temp root, so path comparisons hold where the temp dir is behind a symlink.
fn root() -> (tempfile::TempDir, PathBuf) {
    let td = tempdir().unwrap();
    let base = fs::canonicalize(td.path()).unwrap();
    (td, base)
}

#[test]
fn photo_duplicates_get_counters_in_listing_order() {
    let (_td, base) = root();
    let dir = base.join("photos");
    write_file(&dir.join("photo-icon.png"), "icon");
    write_file(&dir.join("photo-logo.png"), "logo");

    let report = smart_rename(&dir, &remove(&["-icon", "-logo"])).unwrap();
    assert_eq!(names(&dir), vec!["photo (2).png", "photo.png"]);
    assert_eq!(fs::read_to_string(dir.join("photo.png")).unwrap(), "icon");
    assert_eq!(fs::read_to_string(dir.join("photo (2).png")).unwrap(), "logo");
    assert_eq!(report.files_processed(), 2);
    assert_eq!(report.files_renamed(), 2);
    assert_eq!(report.collisions_resolved(), 1);
    assert!(!base.join(STAGING_DIR_NAME).exists(), "staging must be gone after promote");
}

#[test]
fn nested_directories_are_renamed_bottom_up() {
    let (_td, base) = root();
    let dir = base.join("tree");
    write_file(&dir.join("a-tmp.txt"), "a");
    write_file(&dir.join("sub").join("b-tmp.txt"), "b");
    write_file(&dir.join("sub").join("deeper").join("c-tmp.txt"), "c");
    fs::create_dir_all(dir.join("empty")).unwrap();

    let report = smart_rename(&dir, &remove(&["-tmp"])).unwrap();
    assert_eq!(names(&dir), vec!["a.txt", "empty", "sub"]);
    assert_eq!(names(&dir.join("sub")), vec!["b.txt", "deeper"]);
    assert_eq!(names(&dir.join("sub/deeper")), vec!["c.txt"]);
    assert_eq!(fs::read_to_string(dir.join("sub/deeper/c.txt")).unwrap(), "c");
    assert!(dir.join("empty").is_dir());

    let order: Vec<PathBuf> = report.directories.iter().map(|d| d.directory.clone()).collect();
    assert_eq!(order.last(), Some(&dir), "root is processed last");
    let deeper = order.iter().position(|p| p.ends_with("deeper")).unwrap();
    let sub = order.iter().position(|p| p.ends_with("sub")).unwrap();
    assert!(deeper < sub);
}

#[test]
fn second_run_changes_nothing() {
    let (_td, base) = root();
    let dir = base.join("again");
    write_file(&dir.join("x-old.md"), "x");
    write_file(&dir.join("y.md"), "y");
    let opts = remove(&["-old"]);

    smart_rename(&dir, &opts).unwrap();
    let first = names(&dir);
    let report = smart_rename(&dir, &opts).unwrap();
    assert_eq!(names(&dir), first);
    assert_eq!(report.files_renamed(), 0);
    assert_eq!(report.collisions_resolved(), 0);
    assert_eq!(fs::read_to_string(dir.join("x.md")).unwrap(), "x");
}

#[test]
fn file_colliding_with_directory_name_gets_counter() {
    let (_td, base) = root();
    let dir = base.join("mixed");
    fs::create_dir_all(dir.join("notes")).unwrap();
    write_file(&dir.join("notes").join("inner.txt"), "inner");
    write_file(&dir.join("notes-draft"), "draft");

    smart_rename(&dir, &remove(&["-draft"])).unwrap();
    assert_eq!(names(&dir), vec!["notes", "notes (2)"]);
    assert!(dir.join("notes").is_dir());
    assert_eq!(fs::read_to_string(dir.join("notes/inner.txt")).unwrap(), "inner");
    assert_eq!(fs::read_to_string(dir.join("notes (2)")).unwrap(), "draft");
}

#[cfg(unix)]
#[test]
fn symlinks_survive_the_swap() {
    let (_td, base) = root();
    let target = base.join("target.txt");
    write_file(&target, "t");
    let dir = base.join("links");
    write_file(&dir.join("file-x.txt"), "f");
    std::os::unix::fs::symlink(&target, dir.join("link-x")).unwrap();

    smart_rename(&dir, &remove(&["-x"])).unwrap();
    assert_eq!(names(&dir), vec!["file.txt", "link-x"]);
    let meta = fs::symlink_metadata(dir.join("link-x")).unwrap();
    assert!(meta.file_type().is_symlink());
    assert_eq!(fs::read_link(dir.join("link-x")).unwrap(), target);
}

#[test]
fn output_path_mirrors_tree_and_keeps_input() {
    let (_td, base) = root();
    let dir = base.join("src");
    write_file(&dir.join("one-raw.txt"), "1");
    write_file(&dir.join("nested").join("two-raw.txt"), "2");
    let out = base.join("out");

    let report = smart_rename(&dir, &remove(&["-raw"]).output_path(&out)).unwrap();
    assert_eq!(names(&dir), vec!["nested", "one-raw.txt"]);
    assert_eq!(names(&dir.join("nested")), vec!["two-raw.txt"]);
    assert_eq!(names(&out), vec!["nested", "one.txt"]);
    assert_eq!(fs::read_to_string(out.join("nested/two.txt")).unwrap(), "2");
    assert!(report.directories.iter().all(|d| !d.promoted));
}

#[test]
fn output_inside_input_is_rejected() {
    let (_td, base) = root();
    let dir = base.join("in");
    write_file(&dir.join("a.txt"), "a");
    let err = smart_rename(&dir, &remove(&[]).output_path(dir.join("out"))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SmartRenameError>(),
        Some(SmartRenameError::OutputInsideInput { .. })
    ));
    assert_eq!(names(&dir), vec!["a.txt"]);
}

#[test]
fn dry_run_reports_without_touching_disk() {
    let (_td, base) = root();
    let dir = base.join("dry");
    write_file(&dir.join("a-x.txt"), "a");
    write_file(&dir.join("a-y.txt"), "b");

    let report = smart_rename(&dir, &remove(&["-x", "-y"]).dry_run(true)).unwrap();
    assert_eq!(names(&dir), vec!["a-x.txt", "a-y.txt"]);
    assert_eq!(report.collisions_resolved(), 1);
    let planned: Vec<PathBuf> = report.directories[0].mapping.iter().map(|e| e.destination.clone()).collect();
    assert_eq!(planned, vec![dir.join("a.txt"), dir.join("a (2).txt")]);
    assert!(!base.join(STAGING_DIR_NAME).exists());
}

#[test]
fn counter_format_and_post_transform() {
    let (_td, base) = root();
    let dir = base.join("fmt");
    write_file(&dir.join("IMG-1.JPG"), "1");
    write_file(&dir.join("IMG-2.JPG"), "2");

    let opts = SmartRenameOptions::new(TransformOptions::new(vec![Pattern::parse(r"re:-\d+").unwrap()]))
        .format_counter(|name, n| format!("{name}_{n}"))
        .post_transform(|s| s.to_lowercase());
    smart_rename(&dir, &opts).unwrap();
    assert_eq!(names(&dir), vec!["img.JPG", "img_2.JPG"]);
}

#[test]
fn removing_whole_base_keeps_extension() {
    let (_td, base) = root();
    let dir = base.join("whole");
    write_file(&dir.join("photo-icon.png"), "p");
    smart_rename(&dir, &remove(&["photo-icon"])).unwrap();
    assert_eq!(names(&dir), vec![".png"]);
    assert_eq!(fs::read_to_string(dir.join(".png")).unwrap(), "p");
}

#[test]
fn name_that_would_be_empty_is_kept() {
    let (_td, base) = root();
    let dir = base.join("bare");
    write_file(&dir.join("copy"), "c");
    smart_rename(&dir, &remove(&["copy"])).unwrap();
    assert_eq!(names(&dir), vec!["copy"]);
}

#[test]
fn output_path_never_overwrites_existing_files() {
    let (_td, base) = root();
    let dir = base.join("in");
    write_file(&dir.join("photo-icon.png"), "new");
    let out = base.join("out");
    write_file(&out.join("photo.png"), "PRECIOUS");

    let report = smart_rename(&dir, &remove(&["-icon"]).output_path(&out)).unwrap();
    assert_eq!(fs::read_to_string(out.join("photo.png")).unwrap(), "PRECIOUS");
    assert_eq!(fs::read_to_string(out.join("photo (2).png")).unwrap(), "new");
    assert_eq!(report.collisions_resolved(), 1);
}

#[test]
fn dry_run_with_output_reports_existing_names() {
    let (_td, base) = root();
    let dir = base.join("in");
    write_file(&dir.join("a-x.txt"), "a");
    let out = base.join("out");
    write_file(&out.join("a.txt"), "keep");

    let report = smart_rename(&dir, &remove(&["-x"]).output_path(&out).dry_run(true)).unwrap();
    let planned: Vec<PathBuf> = report.directories[0].mapping.iter().map(|e| e.destination.clone()).collect();
    assert_eq!(planned, vec![dir.join("a (2).txt")]);
    assert_eq!(names(&out), vec!["a.txt"]);
}

#[cfg(unix)]
#[test]
fn output_inside_input_through_symlink_is_rejected() {
    let (_td, base) = root();
    let dir = base.join("in");
    write_file(&dir.join("a.txt"), "a");
    let link = base.join("alias");
    std::os::unix::fs::symlink(&dir, &link).unwrap();

    let err = smart_rename(&dir, &remove(&[]).output_path(link.join("out"))).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SmartRenameError>(),
        Some(SmartRenameError::OutputInsideInput { .. })
    ));
    assert!(!dir.join("out").exists());
}

#[test]
fn missing_or_non_directory_input() {
    let (_td, base) = root();
    let err = smart_rename(&base.join("nope"), &remove(&[])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SmartRenameError>(),
        Some(SmartRenameError::InputNotFound(_))
    ));

    let file = base.join("plain.txt");
    write_file(&file, "p");
    let err = smart_rename(&file, &remove(&[])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SmartRenameError>(),
        Some(SmartRenameError::NotADirectory(_))
    ));
}
