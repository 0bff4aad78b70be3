//! End-to-end tests running the `retort` binary against a mock server.
//!
//! Each test gets its own config directory via `RETORT_HOME`, so stored
//! credentials never leak between tests or into the real home directory.

use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use tempfile::TempDir;

const API_KEY: &str = "rk_live_1234567890abcdef";

fn retort(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("retort"));
    cmd.env("RETORT_HOME", home.path())
        .env_remove("RETORT_API_URL")
        .env_remove("RETORT_API_KEY")
        .env_remove("RETORT_TARGET");
    cmd
}

fn retort_against(home: &TempDir, server: &MockServer) -> Command {
    let mut cmd = retort(home);
    cmd.env("RETORT_API_URL", server.base_url());
    cmd
}

#[test]
fn whoami_unauthenticated_reports_authentication_required() {
    let server = MockServer::start();
    let home = tempfile::tempdir().unwrap();

    server.mock(|when, then| {
        when.method("GET").path("/v1/users/me");
        then.status(401)
            .body(r#"{"message": "token expired"}"#);
    });

    retort_against(&home, &server)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(contains("Authentication Required"));
}

#[test]
fn login_with_api_key_stores_credentials_for_later_commands() {
    let server = MockServer::start();
    let home = tempfile::tempdir().unwrap();

    server.mock(|when, then| {
        when.method("GET")
            .path("/v1/users/me")
            .header("authorization", format!("Bearer {}", API_KEY));
        then.status(200)
            .body(r#"{"id": "u1", "email": "dev@lab.io", "team_id": "team-1"}"#);
    });

    retort_against(&home, &server)
        .args(["login", "--api-key", API_KEY])
        .assert()
        .success()
        .stdout(contains("Logged in"));

    assert!(home.path().join("credentials.json").exists());

    // The follow-up command carries the stored token, not a flag.
    retort_against(&home, &server)
        .arg("whoami")
        .assert()
        .success()
        .stdout(contains("dev@lab.io"));
}

#[test]
fn task_list_json_output_is_parseable() {
    let server = MockServer::start();
    let home = tempfile::tempdir().unwrap();

    server.mock(|when, then| {
        when.method("GET").path("/v1/tasks");
        then.status(200)
            .body(r#"[{"id": "t1", "name": "train", "type": "LOCAL"}]"#);
    });

    let assert = retort_against(&home, &server)
        .args(["task", "list", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let tasks: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["id"], "t1");
}

#[test]
fn error_detail_is_shown_on_stderr() {
    let server = MockServer::start();
    let home = tempfile::tempdir().unwrap();

    server.mock(|when, then| {
        when.method("GET").path("/v1/tasks/t1");
        then.status(422)
            .body(r#"{"message": "Invalid task", "detail": "missing plugin"}"#);
    });

    retort_against(&home, &server)
        .args(["task", "show", "t1"])
        .assert()
        .failure()
        .stderr(contains("Invalid task"))
        .stderr(contains("missing plugin"));
}

#[test]
fn queue_remote_without_providers_fails_clearly() {
    let server = MockServer::start();
    let home = tempfile::tempdir().unwrap();

    server.mock(|when, then| {
        when.method("GET").path("/v1/tasks/t1");
        then.status(200).body(r#"{"id": "t1", "type": "REMOTE"}"#);
    });
    server.mock(|when, then| {
        when.method("GET").path("/v1/providers");
        then.status(200).body("[]");
    });

    retort_against(&home, &server)
        .args(["task", "queue", "t1"])
        .assert()
        .failure()
        .stderr(contains("No compute providers"));
}

#[test]
fn config_set_and_show_round_trip() {
    let home = tempfile::tempdir().unwrap();

    retort(&home)
        .args(["config", "set", "target", "cloud"])
        .assert()
        .success();

    retort(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("cloud"));
}

#[test]
fn config_set_rejects_unknown_keys_and_bad_values() {
    let home = tempfile::tempdir().unwrap();

    retort(&home)
        .args(["config", "set", "colour", "mauve"])
        .assert()
        .failure()
        .stderr(contains("Unknown setting"));

    retort(&home)
        .args(["config", "set", "server.local", "not a url"])
        .assert()
        .failure()
        .stderr(contains("Invalid server URL"));
}

#[test]
fn config_show_warns_on_unrecognized_stored_target() {
    let home = tempfile::tempdir().unwrap();

    // A hand-edited or newer-build settings file can hold target values
    // this build does not know.
    std::fs::write(
        home.path().join("settings.json"),
        r#"{"target": "staging"}"#,
    )
    .unwrap();

    retort(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stderr(contains("staging"))
        .stdout(contains("local"));
}

#[test]
fn config_path_prints_the_home_override() {
    let home = tempfile::tempdir().unwrap();

    retort(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(contains(home.path().to_str().unwrap()));
}

#[test]
fn config_endpoints_lists_routes_and_overrides() {
    let home = tempfile::tempdir().unwrap();

    retort(&home)
        .args(["config", "endpoints"])
        .assert()
        .success()
        .stdout(contains("tasks:queue"))
        .stdout(contains("override"));
}

#[test]
fn logout_is_idempotent() {
    let home = tempfile::tempdir().unwrap();

    retort(&home).arg("logout").assert().success();
    retort(&home).arg("logout").assert().success();
}

#[test]
fn server_flag_overrides_stored_target_url() {
    let server = MockServer::start();
    let home = tempfile::tempdir().unwrap();

    let mock = server.mock(|when, then| {
        when.method("GET").path("/v1/experiments");
        then.status(200).body("[]");
    });

    // Stored URL points nowhere; the flag must win.
    retort(&home)
        .args(["config", "set", "server.local", "http://localhost:1"])
        .assert()
        .success();

    retort(&home)
        .args(["experiment", "list", "--server", &server.base_url()])
        .assert()
        .success()
        .stdout(contains("No experiments found."));

    mock.assert();
}
