//! Integration tests for the `devman` CLI binary.
//!
//! Argument parsing, help output and completions run without a service;
//! device commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `devman` binary with env isolation.
///
/// Clears all `DEVMAN_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn devman_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("devman");
    cmd.env("HOME", "/tmp/devman-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/devman-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("DEVMAN_API_BASE_URL")
        .env_remove("DEVMAN_OUTPUT")
        .env_remove("DEVMAN_TIMEOUT")
        .env_remove("DEVMAN_POLL_INTERVAL_MS")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn inventory() -> serde_json::Value {
    json!([
        {"id": 1, "name": "core-router", "ip_address": "10.0.0.1", "type": "router", "location": "Rack A", "status": "online"},
        {"id": 2, "name": "access-switch", "ip_address": "10.0.0.2", "type": "switch", "location": "Floor 2", "status": "offline"},
        {"id": 3, "name": "backup-server", "ip_address": "10.0.0.3", "type": "server", "location": "Rack B"}
    ])
}

async fn inventory_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(inventory()))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = devman_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    devman_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("device inventories")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    devman_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("devman"));
}

#[test]
fn test_completions_bash() {
    devman_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_filter_is_usage_error() {
    devman_cmd()
        .args(["devices", "list", "--status", "sleeping"])
        .assert()
        .code(2);
}

#[test]
fn test_config_path_prints_location() {
    devman_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_reflects_flag() {
    devman_cmd()
        .args(["config", "show", "--api-url", "http://inventory.lan:9000/api/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://inventory.lan:9000/api\""));
}

#[test]
fn test_config_init_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("devman");
    cmd.env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("DEVMAN_API_BASE_URL")
        .args(["config", "init", "--yes", "--api-url", "http://10.1.1.1:3001/api/v1"])
        .assert()
        .success();

    let path = cargo_bin_cmd!("devman")
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "path"])
        .output()
        .unwrap();
    let path = String::from_utf8(path.stdout).unwrap();
    let written = std::fs::read_to_string(path.trim()).unwrap();
    assert!(written.contains("http://10.1.1.1:3001/api/v1"));
}

// ── Device commands ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_list_json_filters_and_sorts() {
    let server = inventory_server().await;

    let output = devman_cmd()
        .args(["devices", "list", "--output", "json-compact", "--api-url"])
        .arg(server.uri())
        .args(["--status", "unknown", "--query", "RACK"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed, json!([{
        "id": "3", "name": "backup-server", "ip_address": "10.0.0.3",
        "type": "server", "location": "Rack B", "status": "unknown"
    }]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_plain_sorted_descending() {
    let server = inventory_server().await;

    devman_cmd()
        .args(["devices", "list", "-o", "plain", "--desc", "--api-url"])
        .arg(server.uri())
        .assert()
        .success()
        .stdout("1\n3\n2\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_unknown_id_exits_not_found() {
    let server = inventory_server().await;

    let output = devman_cmd()
        .args(["devices", "get", "99", "--api-url"])
        .arg(server.uri())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_posts_validated_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/devices"))
        .and(body_json(json!({
            "name": "edge-fw", "ip_address": "192.168.1.254",
            "type": "router", "location": "DMZ", "status": "offline"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {
            "id": "abc", "name": "edge-fw", "ip_address": "192.168.1.254",
            "type": "router", "location": "DMZ", "status": "offline"
        }})))
        .expect(1)
        .mount(&server)
        .await;

    devman_cmd()
        .args(["devices", "add", "--name", "edge-fw", "--ip", "192.168.1.254", "--location", "DMZ"])
        .args(["-o", "plain", "--api-url"])
        .arg(server.uri())
        .assert()
        .success()
        .stdout("abc\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_invalid_input_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let output = devman_cmd()
        .args(["devices", "add", "--name", "x", "--ip", "300.1.1.1", "--location", "y"])
        .args(["--status", "unknown", "--api-url"])
        .arg(server.uri())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Invalid IPv4 address"), "{text}");
    assert!(text.contains("Status must be online or offline"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_remove_without_yes_is_refused_when_not_interactive() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    devman_cmd()
        .args(["devices", "remove", "1", "--api-url"])
        .arg(server.uri())
        .write_stdin("")
        .assert()
        .code(2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_remove_with_yes_deletes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/devices/1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    devman_cmd()
        .args(["devices", "remove", "1", "-y", "--api-url"])
        .arg(server.uri())
        .assert()
        .success()
        .stderr(predicate::str::contains("Deleted device 1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_reads_enveloped_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices/2/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"status": "online"}})))
        .mount(&server)
        .await;

    devman_cmd()
        .args(["devices", "status", "2", "-o", "plain", "--api-url"])
        .arg(server.uri())
        .assert()
        .success()
        .stdout("online\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_message_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "Database unavailable"})))
        .mount(&server)
        .await;

    let output = devman_cmd()
        .args(["devices", "list", "--api-url"])
        .arg(server.uri())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Database unavailable"));
}

#[test]
fn test_unreachable_service_exits_connection() {
    let output = devman_cmd()
        .args(["devices", "list", "--api-url", "http://127.0.0.1:9/api"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}
