use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{init_with_snapshot, rcw, setup_test_db, write_snapshot};

#[test]
fn test_init_creates_database() {
    let db_path = setup_test_db("cli_init");

    rcw("cli_init")
        .args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Database initialized"));

    assert!(std::path::Path::new(&db_path).exists());
}

#[test]
fn test_owners_follow_shift_handoff() {
    let db = init_with_snapshot("cli_owners");

    rcw("cli_owners")
        .args(["--db", &db, "owners", "1"])
        .assert()
        .success()
        .stdout(contains("alice").and(contains("bob")))
        .stdout(contains("09:30"));
}

#[test]
fn test_excluded_event_has_no_owner() {
    let db = init_with_snapshot("cli_owners_excluded");

    rcw("cli_owners_excluded")
        .args(["--db", &db, "owners", "2"])
        .assert()
        .success()
        .stdout(contains("Nobody owns this event"));
}

#[test]
fn test_timeline_states_at_given_time() {
    let db = init_with_snapshot("cli_timeline");

    rcw("cli_timeline")
        .args(["--db", &db, "timeline", "1", "--now", "2025-03-10 09:05"])
        .assert()
        .success()
        .stdout(contains("due"))
        .stdout(contains("upcoming"))
        .stdout(contains("3 of 3 checks still open"));
}

#[test]
fn test_timeline_json_output() {
    let db = init_with_snapshot("cli_timeline_json");

    rcw("cli_timeline_json")
        .args(["--db", &db, "timeline", "1", "--json", "--now", "2025-03-10 09:12"])
        .assert()
        .success()
        .stdout(contains("\"state\": \"overdue\""));
}

#[test]
fn test_complete_is_idempotent_and_reports_lateness() {
    let db = init_with_snapshot("cli_complete");

    rcw("cli_complete")
        .args(["--db", &db, "complete", "1", "1", "--user", "alice", "--now", "2025-03-10 09:25"])
        .assert()
        .success()
        .stdout(contains("completed at 09:25"))
        .stdout(contains("15m late"));

    rcw("cli_complete")
        .args(["--db", &db, "complete", "1", "1", "--user", "alice", "--now", "2025-03-10 09:27"])
        .assert()
        .success()
        .stdout(contains("already completed by alice at 09:25"));

    rcw("cli_complete")
        .args(["--db", &db, "timeline", "1", "--now", "2025-03-10 09:28"])
        .assert()
        .success()
        .stdout(contains("completed"))
        .stdout(contains("15m late"));
}

#[test]
fn test_complete_rejects_non_owner() {
    let db = init_with_snapshot("cli_complete_auth");

    rcw("cli_complete_auth")
        .args(["--db", &db, "complete", "1", "2", "--user", "alice", "--now", "2025-03-10 09:35"])
        .assert()
        .failure()
        .stderr(contains("Error:"))
        .stderr(contains("not an owner"));

    rcw("cli_complete_auth")
        .args(["--db", &db, "complete", "1", "2", "--user", "bob", "--now", "2025-03-10 09:35"])
        .assert()
        .success()
        .stdout(contains("on time"));
}

#[test]
fn test_complete_unknown_event_or_check() {
    let db = init_with_snapshot("cli_complete_missing");

    rcw("cli_complete_missing")
        .args(["--db", &db, "complete", "99", "1", "--user", "alice", "--now", "2025-03-10 09:05"])
        .assert()
        .failure()
        .stderr(contains("Event not found: 99"));

    rcw("cli_complete_missing")
        .args(["--db", &db, "complete", "1", "4", "--user", "alice", "--now", "2025-03-10 09:05"])
        .assert()
        .failure()
        .stderr(contains("has no check #4"));
}

#[test]
fn test_complete_requires_a_user() {
    let db = init_with_snapshot("cli_complete_nouser");

    rcw("cli_complete_nouser")
        .args(["--db", &db, "complete", "1", "1", "--now", "2025-03-10 09:05"])
        .assert()
        .failure()
        .stderr(contains("no user given"));
}

#[test]
fn test_sweep_marks_missed_and_blocks_completion() {
    let db = init_with_snapshot("cli_sweep");

    // event 1: slots 09:00 and 09:30 elapsed; event 2: 09:00 and 09:30
    rcw("cli_sweep")
        .args(["--db", &db, "sweep", "--now", "2025-03-10 10:05"])
        .assert()
        .success()
        .stdout(contains("4 checks marked as missed"));

    rcw("cli_sweep")
        .args(["--db", &db, "sweep", "--now", "2025-03-10 10:06"])
        .assert()
        .success()
        .stdout(contains("No checks to mark as missed"));

    rcw("cli_sweep")
        .args(["--db", &db, "complete", "1", "2", "--user", "bob", "--now", "2025-03-10 09:40"])
        .assert()
        .failure()
        .stderr(contains("missed"));
}

#[test]
fn test_watch_notifies_once_per_check() {
    let db = init_with_snapshot("cli_watch");

    rcw("cli_watch")
        .args(["--db", &db, "watch", "--user", "alice", "--ticks", "1", "--now", "2025-03-10 09:04"])
        .assert()
        .success()
        .stdout(contains("Recording check due: GH 1420&30"));

    rcw("cli_watch")
        .args(["--db", &db, "watch", "--user", "alice", "--ticks", "1", "--now", "2025-03-10 09:08"])
        .assert()
        .success()
        .stdout(contains("Recording check due").not());

    rcw("cli_watch")
        .args(["--db", &db, "notifications", "--user", "alice", "--unread", "--mark-read"])
        .assert()
        .success()
        .stdout(contains("Recording check due: GH 1420&30"))
        .stdout(contains("1 notifications marked as read"));

    rcw("cli_watch")
        .args(["--db", &db, "notifications", "--user", "alice", "--unread"])
        .assert()
        .success()
        .stdout(contains("No notifications for alice"));
}

#[test]
fn test_watch_ignores_users_without_ownership() {
    let db = init_with_snapshot("cli_watch_other");

    rcw("cli_watch_other")
        .args(["--db", &db, "watch", "--user", "carol", "--ticks", "1", "--now", "2025-03-10 09:04"])
        .assert()
        .success()
        .stdout(contains("Recording check").not());
}

#[test]
fn test_import_rejects_invalid_snapshot() {
    let db = setup_test_db("cli_import_bad");
    rcw("cli_import_bad")
        .args(["--db", &db, "--test", "init"])
        .assert()
        .success();

    let bad = write_snapshot("cli_import_bad", "events: [ { id: x } ]");
    rcw("cli_import_bad")
        .args(["--db", &db, "import", &bad])
        .assert()
        .failure()
        .stderr(contains("Error:"));
}

#[test]
fn test_log_records_import() {
    let db = init_with_snapshot("cli_log");

    rcw("cli_log")
        .args(["--db", &db, "log", "--print"])
        .assert()
        .success()
        .stdout(contains("import"))
        .stdout(contains("migration_applied"));
}

#[test]
fn test_config_print_shows_defaults() {
    let db = setup_test_db("cli_config");

    rcw("cli_config")
        .args(["--db", &db, "config", "--print"])
        .assert()
        .success()
        .stdout(contains("check_interval_minutes: 30"))
        .stdout(contains("post_event_grace_minutes: 120"));
}
