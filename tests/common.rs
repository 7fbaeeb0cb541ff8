#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Events and shifts for Monday 2025-03-10.
///
/// Event 1 (GH 1420&30, 09:00-10:30) is owned by alice until 09:30 and by
/// bob afterwards. Event 2 is an excluded type and has no owner.
pub const SNAPSHOT: &str = r#"
events:
  - id: 1
    date: 2025-03-10
    start_time: "09:00"
    end_time: "10:30"
    room_name: "GH 1420&30"
    event_type: lecture
    requires_check: true
  - id: 2
    date: 2025-03-10
    start_time: "09:00"
    end_time: "10:00"
    room_name: "AB 200"
    event_type: external
    requires_check: true
    manual_owner: carol
shifts:
  - id: 1
    date: 2025-03-10
    start_time: "08:00"
    end_time: "09:30"
    assignments:
      - owner_id: alice
        rooms: ["GH 1420"]
  - id: 2
    date: 2025-03-10
    start_time: "09:30"
    end_time: "12:00"
    assignments:
      - owner_id: bob
        rooms: ["GH 1430"]
"#;

/// Per-test home directory so no real `~/.recwatch` is touched.
pub fn test_home(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_recwatch_home", name));
    fs::create_dir_all(&path).ok();
    path
}

pub fn rcw(name: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("recwatch");
    cmd.env("RECWATCH_HOME", test_home(name));
    cmd.env_remove("RECWATCH_LOG");
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_recwatch.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

pub fn write_snapshot(name: &str, content: &str) -> String {
    let path = temp_out(&format!("{name}_snapshot"), "yaml");
    fs::write(&path, content).expect("write snapshot");
    path
}

/// Initialize a fresh DB and import [`SNAPSHOT`]; returns the DB path.
pub fn init_with_snapshot(name: &str) -> String {
    let db_path = setup_test_db(name);

    rcw(name)
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success();

    let snapshot = write_snapshot(name, SNAPSHOT);
    rcw(name)
        .args(["--db", &db_path, "import", &snapshot])
        .assert()
        .success();

    db_path
}
