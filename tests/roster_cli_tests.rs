// Integration tests for the roster, keys and profile commands
// These run the real binary against a temporary HOME

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use std::fs;

const ADMIN_KEY: &str = "backstage";

/// Temporary HOME holding one admin key
fn setup_test_env() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_rc(&temp_dir, "");

    new_cmd(&temp_dir)
        .args(["keys", "add", ADMIN_KEY, "--role", "admin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered admin key"));
    temp_dir
}

/// Port 1 never hosts a live server, so edits do not find one to notify
fn write_rc(temp_dir: &TempDir, extra: &str) {
    let config_dir = temp_dir.path().join(".cosboard");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("rc"), format!("live.listen=127.0.0.1:1\n{}", extra)).unwrap();
}

fn new_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cosboard").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

fn add_akira(temp_dir: &TempDir) {
    new_cmd(temp_dir)
        .args(["roster", "add", "Akira", "--character", "Kaneda", "--time", "2026-10-18 14:00",
               "--key", ADMIN_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added contestant 'Akira' at 2026-10-18 14:00"));
}

#[test]
fn test_roster_add_and_list() {
    let temp_dir = setup_test_env();
    add_akira(&temp_dir);

    new_cmd(&temp_dir)
        .args(["roster", "add", "Rei", "--character", "Ayanami", "--time", "2026-10-18 13:00",
               "--comment", "plugsuit", "--key", ADMIN_KEY])
        .assert()
        .success();

    let output = new_cmd(&temp_dir)
        .args(["roster", "list", "--key", ADMIN_KEY])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();

    // Ordered by performance time
    let rei = stdout.find("Rei").unwrap();
    let akira = stdout.find("Akira").unwrap();
    assert!(rei < akira);
    assert!(stdout.contains("plugsuit"));
}

#[test]
fn test_roster_edit_without_live_server_still_succeeds() {
    let temp_dir = setup_test_env();
    add_akira(&temp_dir);

    new_cmd(&temp_dir)
        .args(["roster", "delete", "Akira", "--key", ADMIN_KEY])
        .assert()
        .success()
        .stderr(predicate::str::contains("Live viewers were not notified"));
}

#[test]
fn test_roster_add_duplicate_fails() {
    let temp_dir = setup_test_env();
    add_akira(&temp_dir);

    new_cmd(&temp_dir)
        .args(["roster", "add", "Akira", "--character", "Tetsuo", "--time", "15:00",
               "--key", ADMIN_KEY])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_roster_add_rejects_bad_input() {
    let temp_dir = setup_test_env();

    new_cmd(&temp_dir)
        .args(["roster", "add", "Akira", "--character", "Kaneda", "--time", "noonish",
               "--key", ADMIN_KEY])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error:"))
        .stderr(predicate::str::contains("Invalid time"));

    new_cmd(&temp_dir)
        .args(["roster", "add", "Akira", "--character", "Kaneda", "--time", "14:00",
               "--audio", "file:///music.mp3", "--key", ADMIN_KEY])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid audio URL"));

    new_cmd(&temp_dir)
        .args(["roster", "add", "", "--character", "Kaneda", "--time", "14:00",
               "--key", ADMIN_KEY])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Stage name cannot be empty"));
}

#[test]
fn test_roster_edits_require_a_key() {
    let temp_dir = setup_test_env();

    new_cmd(&temp_dir)
        .args(["roster", "add", "Akira", "--character", "Kaneda", "--time", "14:00"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Access key is required"));

    new_cmd(&temp_dir)
        .args(["roster", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Access key is required"));
}

#[test]
fn test_user_key_cannot_edit_roster() {
    let temp_dir = setup_test_env();
    add_akira(&temp_dir);
    new_cmd(&temp_dir)
        .args(["keys", "add", "fan", "--key", ADMIN_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered user key"));

    new_cmd(&temp_dir)
        .args(["roster", "add", "Rei", "--character", "Ayanami", "--time", "13:00", "--key", "fan"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Forbidden: admin access required"));

    new_cmd(&temp_dir)
        .args(["roster", "delete", "Akira", "--key", "fan"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Forbidden: admin access required"));

    new_cmd(&temp_dir)
        .args(["roster", "show", "Akira", "--key", "fan"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Forbidden"));

    // Akira is still on the roster
    new_cmd(&temp_dir)
        .args(["roster", "list", "--key", ADMIN_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Akira"))
        .stdout(predicate::str::contains("Rei").not());
}

#[test]
fn test_roster_show_json_has_cleared_flags() {
    let temp_dir = setup_test_env();
    add_akira(&temp_dir);

    let output = new_cmd(&temp_dir)
        .args(["roster", "show", "Akira", "--json", "--key", ADMIN_KEY])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(json["stage_name"], "Akira");
    assert_eq!(json["character"], "Kaneda");
    for flag in ["crossed_out_main", "glowing_main", "crossed_out_prejudge", "glowing_prejudge"] {
        assert_eq!(json["flags"][flag], false, "{} should start false", flag);
    }
}

#[test]
fn test_roster_show_missing() {
    let temp_dir = setup_test_env();

    new_cmd(&temp_dir)
        .args(["roster", "show", "Ghost", "--key", ADMIN_KEY])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Contestant 'Ghost' not found"));
}

#[test]
fn test_roster_modify_and_prejudge_list() {
    let temp_dir = setup_test_env();
    add_akira(&temp_dir);

    new_cmd(&temp_dir)
        .args(["roster", "list", "--prejudge", "--key", ADMIN_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("No contestants scheduled for pre-judging."));

    new_cmd(&temp_dir)
        .args(["roster", "modify", "Akira", "--prejudge-time", "2026-10-18 10:30",
               "--comment", "bike prop", "--key", ADMIN_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Modified contestant 'Akira'"));

    new_cmd(&temp_dir)
        .args(["roster", "list", "--prejudge", "--key", ADMIN_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Akira"))
        .stdout(predicate::str::contains("2026-10-18 10:30"));

    new_cmd(&temp_dir)
        .args(["roster", "modify", "Akira", "--no-prejudge", "--key", ADMIN_KEY])
        .assert()
        .success();

    new_cmd(&temp_dir)
        .args(["roster", "list", "--prejudge", "--key", ADMIN_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Akira").not());
}

#[test]
fn test_roster_modify_without_changes() {
    let temp_dir = setup_test_env();
    add_akira(&temp_dir);

    new_cmd(&temp_dir)
        .args(["roster", "modify", "Akira", "--key", ADMIN_KEY])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No changes specified"));
}

#[test]
fn test_roster_delete() {
    let temp_dir = setup_test_env();
    add_akira(&temp_dir);

    new_cmd(&temp_dir)
        .args(["roster", "delete", "Akira", "--key", ADMIN_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted contestant 'Akira'"));

    new_cmd(&temp_dir)
        .args(["roster", "delete", "Akira", "--key", ADMIN_KEY])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_user_key_sees_only_names_and_times() {
    let temp_dir = setup_test_env();
    new_cmd(&temp_dir)
        .args(["roster", "add", "Akira", "--character", "Kaneda", "--time", "2026-10-18 14:00",
               "--comment", "secret prop", "--key", ADMIN_KEY])
        .assert()
        .success();
    new_cmd(&temp_dir)
        .args(["keys", "add", "akira-key", "--stage-name", "Akira", "--key", ADMIN_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered user key for 'Akira'"));

    new_cmd(&temp_dir)
        .args(["roster", "list", "--key", "akira-key"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Akira"))
        .stdout(predicate::str::contains("Kaneda").not())
        .stdout(predicate::str::contains("secret prop").not());
}

#[test]
fn test_list_with_invalid_key() {
    let temp_dir = setup_test_env();

    new_cmd(&temp_dir)
        .args(["roster", "list", "--key", "forged"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid access key"));
}

#[test]
fn test_first_key_must_be_admin() {
    let temp_dir = TempDir::new().unwrap();
    write_rc(&temp_dir, "");

    new_cmd(&temp_dir)
        .args(["keys", "add", "fan"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No admin key exists yet"));

    new_cmd(&temp_dir)
        .args(["keys", "add", ADMIN_KEY, "--role", "admin"])
        .assert()
        .success();

    // Once an admin exists, registering needs its key
    new_cmd(&temp_dir)
        .args(["keys", "add", "door", "--role", "admin"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Access key is required"));
}

#[test]
fn test_keys_verify_and_remove() {
    let temp_dir = setup_test_env();

    new_cmd(&temp_dir)
        .args(["keys", "add", "door", "--role", "admin", "--key", ADMIN_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered admin key"));

    new_cmd(&temp_dir)
        .args(["keys", "verify", "door"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Role: admin"));

    new_cmd(&temp_dir)
        .args(["keys", "remove", "door", "--key", ADMIN_KEY])
        .assert()
        .success();

    new_cmd(&temp_dir)
        .args(["keys", "verify", "door"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid access key"));
}

#[test]
fn test_user_key_cannot_manage_keys() {
    let temp_dir = setup_test_env();
    new_cmd(&temp_dir)
        .args(["keys", "add", "fan", "--key", ADMIN_KEY])
        .assert()
        .success();

    new_cmd(&temp_dir)
        .args(["keys", "add", "fan-2", "--key", "fan"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Forbidden"));

    new_cmd(&temp_dir)
        .args(["keys", "remove", ADMIN_KEY, "--key", "fan"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Forbidden"));
}

#[test]
fn test_keys_add_rejects_unknown_role() {
    let temp_dir = setup_test_env();

    new_cmd(&temp_dir)
        .args(["keys", "add", "k", "--role", "judge", "--key", ADMIN_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown role"));
}

#[test]
fn test_profile_shows_own_entry() {
    let temp_dir = setup_test_env();
    add_akira(&temp_dir);
    new_cmd(&temp_dir)
        .args(["roster", "add", "Rei", "--character", "Ayanami", "--time", "13:00",
               "--key", ADMIN_KEY])
        .assert()
        .success();
    new_cmd(&temp_dir)
        .args(["keys", "add", "akira-key", "--stage-name", "Akira", "--key", ADMIN_KEY])
        .assert()
        .success();

    new_cmd(&temp_dir)
        .args(["profile", "--key", "akira-key"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stage Name:     Akira"))
        .stdout(predicate::str::contains("Kaneda"))
        .stdout(predicate::str::contains("Rei").not());
}

#[test]
fn test_profile_requires_linked_contestant() {
    let temp_dir = setup_test_env();

    new_cmd(&temp_dir)
        .args(["profile", "--key", ADMIN_KEY])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No contestant is linked to this key"));
}

#[test]
fn test_data_location_from_rc() {
    let temp_dir = TempDir::new().unwrap();
    write_rc(&temp_dir, "data.location=./show.db\n");
    let config_dir = temp_dir.path().join(".cosboard");

    new_cmd(&temp_dir)
        .args(["keys", "add", ADMIN_KEY, "--role", "admin"])
        .assert()
        .success();
    add_akira(&temp_dir);

    assert!(config_dir.join("show.db").exists());
    assert!(!config_dir.join("roster.db").exists());
}

#[test]
fn test_toggle_rejects_unknown_axis() {
    let temp_dir = setup_test_env();

    new_cmd(&temp_dir)
        .args(["toggle", "Akira", "sparkle-main", "--connect", "127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown flag 'sparkle-main'"));
}

#[test]
fn test_toggle_without_server_fails() {
    let temp_dir = setup_test_env();

    // Port 1 is never a cosboard server
    new_cmd(&temp_dir)
        .args(["toggle", "Akira", "glow-main", "--connect", "127.0.0.1:1"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Failed to connect to live server"));
}
