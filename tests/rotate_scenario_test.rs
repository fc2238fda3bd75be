use chrono::{DateTime, Duration, Utc};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tempfile::tempdir;
use zip::ZipArchive;

fn plant(path: &Path, contents: &[u8], modified: DateTime<Utc>) {
    fs::write(path, contents).expect("write file");
    let file = File::options()
        .write(true)
        .open(path)
        .expect("open for mtime");
    file.set_modified(modified.into()).expect("set mtime");
}

#[test]
fn rotate_archives_aged_logs_and_removes_sources() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("site1");
    fs::create_dir_all(&root).expect("mkdir root");

    let ten_days_ago = Utc::now() - Duration::days(10);
    plant(&root.join("a.log"), &[b'x'; 120], ten_days_ago);
    plant(&root.join("b.log"), b"", ten_days_ago);

    assert_cmd::cargo::cargo_bin_cmd!("logreap")
        .current_dir(tmp.path())
        .env("LOGREAP_HOST", "testhost")
        .env("LOGREAP_CONFIG_DIR", tmp.path())
        .arg("rotate")
        .arg(&root)
        .assert()
        .success();

    assert!(!root.join("a.log").exists());
    assert!(!root.join("b.log").exists());

    let month = ten_days_ago.format("%Y-%m");
    let archive = root.join(format!("testhost-site1-{month}.zip"));
    let mut zip = ZipArchive::new(File::open(&archive).expect("open archive")).expect("read zip");

    let mut buf = Vec::new();
    zip.by_name("a.log")
        .expect("a.log entry")
        .read_to_end(&mut buf)
        .expect("read entry");
    assert_eq!(buf, vec![b'x'; 120]);
    assert_eq!(zip.by_name("b.log").expect("b.log entry").size(), 0);
}

#[test]
fn fresh_files_are_left_alone() {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().join("site1");
    fs::create_dir_all(&root).expect("mkdir root");

    plant(&root.join("recent.log"), b"still hot", Utc::now());

    assert_cmd::cargo::cargo_bin_cmd!("logreap")
        .current_dir(tmp.path())
        .env("LOGREAP_HOST", "testhost")
        .env("LOGREAP_CONFIG_DIR", tmp.path())
        .arg("rotate")
        .arg(&root)
        .assert()
        .success();

    assert!(root.join("recent.log").exists());
    let archives = fs::read_dir(&root)
        .expect("read root")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "zip"))
        .count();
    assert_eq!(archives, 0);
}

#[test]
fn missing_root_is_reported_but_other_roots_rotate() {
    let tmp = tempdir().expect("tempdir");
    let present = tmp.path().join("site1");
    fs::create_dir_all(&present).expect("mkdir root");

    let ten_days_ago = Utc::now() - Duration::days(10);
    plant(&present.join("a.log"), b"payload", ten_days_ago);

    assert_cmd::cargo::cargo_bin_cmd!("logreap")
        .current_dir(tmp.path())
        .env("LOGREAP_HOST", "testhost")
        .env("LOGREAP_CONFIG_DIR", tmp.path())
        .arg("rotate")
        .arg(tmp.path().join("does-not-exist"))
        .arg(&present)
        .assert()
        .success()
        .stdout(predicates::str::contains("root not found"));

    assert!(!present.join("a.log").exists());
}
