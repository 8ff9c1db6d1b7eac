//! CLI integration tests

use std::process::{Command, Output};

fn fundify(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fundify"))
        .args(args)
        .env_remove("FUNDIFY_API_URL")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = fundify(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Fundify ML Prediction API"), "Should show app name");
    assert!(stdout.contains("health"), "Should show health command");
    assert!(stdout.contains("load"), "Should show load command");
    assert!(stdout.contains("info"), "Should show info command");
    assert!(stdout.contains("predict"), "Should show predict command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = fundify(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("fundify"), "Should show binary name");
}

/// Test predict subcommand help
#[test]
fn test_predict_help() {
    let output = fundify(&["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Predict help should succeed");
    assert!(stdout.contains("--file"), "Should show file option");
    assert!(stdout.contains("--main-category"), "Should show main-category option");
    assert!(stdout.contains("--pkr-goal-real"), "Should show pkr-goal-real option");
}

/// Test that predict requires either a file or every field
#[test]
fn test_predict_requires_fields() {
    let output = fundify(&["predict", "--main-category", "Games"]);

    assert!(!output.status.success(), "Incomplete flags should fail");
}

/// Test invalid output format handling
#[test]
fn test_invalid_format() {
    let output = fundify(&["--format", "invalid", "health"]);

    assert!(!output.status.success(), "Invalid format should fail");
}

/// Test health against a mock service
#[test]
fn test_health_against_mock_service() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/")
        .with_body(
            r#"{"status":"healthy","message":"Fundify ML Prediction API is running","models_loaded":true}"#,
        )
        .create();

    let output = fundify(&["--api-url", &server.url(), "--format", "json", "health"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Health should succeed");
    assert!(stdout.contains("\"models_loaded\": true"));
}

/// Test that an error payload with status 200 exits non-zero
#[test]
fn test_predict_error_payload_exits_non_zero() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/predict")
        .with_body(r#"{"error":"Unknown category: Knitting"}"#)
        .create();

    let output = fundify(&[
        "--api-url",
        &server.url(),
        "predict",
        "--main-category",
        "Knitting",
        "--currency",
        "USD",
        "--goal",
        "5000",
        "--pledged",
        "7500",
        "--backers",
        "120",
        "--country",
        "US",
        "--pkr-pledged",
        "2085000",
        "--pkr-pledged-real",
        "2085000",
        "--pkr-goal-real",
        "1390000",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Error payload should fail");
    assert!(stderr.contains("Unknown category: Knitting"));
}

/// Test that a failed model load exits non-zero
#[test]
fn test_failed_load_exits_non_zero() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/load-models")
        .with_body(r#"{"status":"error","message":"Failed to fetch classifier"}"#)
        .create();

    let output = fundify(&["--api-url", &server.url(), "load"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Failed load should fail");
    assert!(stderr.contains("Failed to fetch classifier"));
}

/// Test that an unreachable service is reported
#[test]
fn test_unreachable_service() {
    let output = fundify(&["--api-url", "http://127.0.0.1:9", "health"]);

    assert!(!output.status.success(), "Unreachable service should fail");
}
