// tests/fs_abstraction.rs

use std::path::{Path, PathBuf};

use servectl::fs::mock::MockFileSystem;
use servectl::fs::{FileSystem, RealFileSystem};

#[test]
fn mock_write_creates_parent_dirs() {
    let fs = MockFileSystem::new();
    fs.write(Path::new("./src/.shutdown"), b"").unwrap();

    assert!(fs.is_file(Path::new("./src/.shutdown")));
    assert!(fs.is_dir(Path::new("./src")));
    assert_eq!(
        fs.read_dir(Path::new(".")).unwrap(),
        vec![PathBuf::from("./src")]
    );
    assert_eq!(fs.read_to_string(Path::new("./src/.shutdown")).unwrap(), "");
}

#[test]
fn mock_remove_file_unlinks_from_parent() {
    let fs = MockFileSystem::new();
    fs.add_file("./src/.shutdown", "");
    fs.add_file("./src/server.js", "");

    fs.remove_file(Path::new("./src/.shutdown")).unwrap();

    assert!(!fs.exists(Path::new("./src/.shutdown")));
    assert_eq!(
        fs.read_dir(Path::new("./src")).unwrap(),
        vec![PathBuf::from("./src/server.js")]
    );
    assert!(fs.remove_file(Path::new("./src/.shutdown")).is_err());
}

#[test]
fn mock_remove_file_refuses_directories() {
    let fs = MockFileSystem::new();
    fs.add_dir("./views");
    assert!(fs.remove_file(Path::new("./views")).is_err());
}

#[test]
fn mock_remove_dir_all_drops_subtree_only() {
    let fs = MockFileSystem::new();
    fs.add_file("./views/dist/app.js", "");
    fs.add_file("./views/dist/css/site.css", "");
    fs.add_file("./views/distribution.txt", "");

    fs.remove_dir_all(Path::new("./views/dist")).unwrap();

    assert!(!fs.exists(Path::new("./views/dist")));
    assert!(!fs.exists(Path::new("./views/dist/css/site.css")));
    assert!(fs.exists(Path::new("./views/distribution.txt")));
    assert_eq!(
        fs.read_dir(Path::new("./views")).unwrap(),
        vec![PathBuf::from("./views/distribution.txt")]
    );
}

#[test]
fn mock_remove_dir_all_missing_is_ok() {
    let fs = MockFileSystem::new();
    fs.remove_dir_all(Path::new("./nope")).unwrap();
}

#[test]
fn mock_create_dir_all_rejects_existing_file() {
    let fs = MockFileSystem::new();
    fs.add_file("./views/dist", "a file");
    assert!(fs.create_dir_all(Path::new("./views/dist")).is_err());
}

#[test]
fn mock_read_errors() {
    let fs = MockFileSystem::new();
    fs.add_dir("./views");
    fs.add_file("./bin.dat", vec![0xff, 0xfe]);

    assert!(fs.read_to_string(Path::new("./missing.json")).is_err());
    assert!(fs.read_to_string(Path::new("./views")).is_err());
    assert!(fs.read_to_string(Path::new("./bin.dat")).is_err());
    assert!(fs.read_dir(Path::new("./bin.dat")).is_err());
}

#[test]
fn mock_clones_share_state() {
    let fs = MockFileSystem::new();
    let other = fs.clone();
    other.add_file("./config.json", "{}");
    assert!(fs.exists(Path::new("./config.json")));
}

#[test]
fn real_fs_round_trip_and_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let fs = RealFileSystem;
    let sentinel = dir.path().join("src/.shutdown");

    fs.write(&sentinel, b"").unwrap();
    assert!(fs.is_file(&sentinel));
    assert!(fs.is_dir(&dir.path().join("src")));

    fs.remove_file(&sentinel).unwrap();
    assert!(!fs.exists(&sentinel));

    let dist = dir.path().join("views/dist");
    fs.write(&dist.join("app.js"), b"old").unwrap();
    fs.remove_dir_all(&dist).unwrap();
    assert!(!fs.exists(&dist));
    fs.remove_dir_all(&dist).unwrap();

    fs.create_dir_all(&dist).unwrap();
    assert!(fs.read_dir(&dist).unwrap().is_empty());
}

#[cfg(unix)]
#[test]
fn real_fs_reports_symlinks_without_following() {
    let dir = tempfile::tempdir().unwrap();
    let fs = RealFileSystem;
    let target = dir.path().join("assets");
    let link = dir.path().join("linked");
    fs.create_dir_all(&target).unwrap();
    std::os::unix::fs::symlink(&target, &link).unwrap();

    assert!(fs.is_dir(&link));
    assert!(fs.is_symlink(&link));
    assert!(!fs.is_symlink(&target));
    assert!(!fs.is_symlink(&dir.path().join("missing")));
}
