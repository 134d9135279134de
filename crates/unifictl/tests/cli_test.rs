//! Integration tests for the `unifictl` binary.
//!
//! Argument parsing and error exits run without a controller; the end-to-end
//! cases drive the binary against a wiremock controller.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the binary with env isolation.
///
/// Clears all `UNIFICTL_*` env vars and points config directories at an
/// empty temp dir so tests never touch the user's real configuration.
fn unifictl_cmd(home: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("unifictl");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env_remove("RUST_LOG")
        .env_remove("UNIFICTL_PROFILE")
        .env_remove("UNIFICTL_CONTROLLER")
        .env_remove("UNIFICTL_SITE")
        .env_remove("UNIFICTL_USERNAME")
        .env_remove("UNIFICTL_PASSWORD")
        .env_remove("UNIFICTL_INSECURE")
        .env_remove("UNIFICTL_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": data }))
}

async fn controller() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ok(json!([])).insert_header("set-cookie", "unifises=s3ss10n; Path=/"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ok(json!([])))
        .mount(&server)
        .await;
    server
}

/// Run the binary against `server` off the async runtime.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let uri = server.uri();
    let args: Vec<String> = args.iter().map(|a| (*a).to_owned()).collect();
    tokio::task::spawn_blocking(move || {
        let home = tempfile::tempdir().unwrap();
        unifictl_cmd(&home)
            .args(["--controller", &uri, "--username", "admin", "--password", "pw"])
            .args(&args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = unifictl_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    unifictl_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("sites")
            .and(predicate::str::contains("guest"))
            .and(predicate::str::contains("stats")),
    );
}

#[test]
fn completions_bash() {
    let home = tempfile::tempdir().unwrap();
    unifictl_cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn no_controller_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    unifictl_cmd(&home)
        .arg("sites")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No controller configured"));
}

#[test]
fn invalid_mac_is_rejected_by_parser() {
    let home = tempfile::tempdir().unwrap();
    let output = unifictl_cmd(&home)
        .args(["guest", "kick", "zz:zz"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("zz:zz"));
}

#[test]
fn missing_username_is_an_auth_error() {
    let home = tempfile::tempdir().unwrap();
    unifictl_cmd(&home)
        .args(["--controller", "https://127.0.0.1:1", "sites"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No credentials"));
}

#[test]
fn unknown_profile_is_reported() {
    let home = tempfile::tempdir().unwrap();
    unifictl_cmd(&home)
        .args(["--profile", "nope", "sites"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn unreachable_controller_is_a_connection_error() {
    let home = tempfile::tempdir().unwrap();
    unifictl_cmd(&home)
        .args([
            "--controller",
            "http://127.0.0.1:1",
            "--username",
            "admin",
            "--password",
            "pw",
            "sites",
        ])
        .assert()
        .code(7);
}

// ── Against a mock controller ───────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn sites_prints_records() {
    let server = controller().await;
    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .respond_with(ok(json!([{ "name": "default", "desc": "Default" }])))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(&server, &["sites"]).await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let printed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed[0]["name"], "default");
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_command_exits_nine() {
    let server = controller().await;
    Mock::given(method("POST"))
        .and(path("/api/s/default/cmd/stamgr"))
        .and(body_partial_json(json!({ "cmd": "authorize-guest" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.InvalidTargetMac" },
            "data": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &["guest", "authorize", "aa:bb:cc:dd:ee:ff", "--minutes", "30"],
    )
    .await;

    assert_eq!(output.status.code(), Some(9), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("authorize-guest"));
}

#[tokio::test(flavor = "multi_thread")]
async fn persistent_expiry_exits_with_auth_code() {
    let server = controller().await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sta/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.LoginRequired" },
            "data": [],
        })))
        .expect(3)
        .mount(&server)
        .await;

    let output = run_against(&server, &["clients"]).await;

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("kept expiring"));
}

async fn mount_branch_ap(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .respond_with(ok(json!([{ "name": "default" }, { "name": "branch" }])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/device/"))
        .respond_with(ok(json!([])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/s/branch/stat/device/"))
        .respond_with(ok(json!([{ "mac": "f0:9f:c2:33:94:27" }])))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn ap_stats_without_site_follow_the_access_point() {
    let server = controller().await;
    mount_branch_ap(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/s/branch/stat/report/hourly.ap"))
        .and(body_partial_json(json!({ "mac": "f0:9f:c2:33:94:27" })))
        .respond_with(ok(json!([{ "time": 1, "bytes": 42 }])))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &["stats", "ap", "-g", "hourly", "--mac", "F0:9F:C2:33:94:27"],
    )
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn explicit_default_site_skips_access_point_lookup() {
    let server = controller().await;
    Mock::given(method("GET"))
        .and(path("/api/self/sites"))
        .respond_with(ok(json!([])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/s/default/cmd/stamgr"))
        .and(body_partial_json(json!({
            "cmd": "authorize-guest",
            "ap_mac": "f0:9f:c2:33:94:27",
        })))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let output = run_against(
        &server,
        &[
            "--site",
            "default",
            "guest",
            "authorize",
            "aa:bb:cc:dd:ee:ff",
            "--minutes",
            "30",
            "--ap-mac",
            "f0:9f:c2:33:94:27",
        ],
    )
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
}
