//! CLI integration tests

use std::process::Command;

fn csr() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_csr"));
    for var in ["CSR_API_URL", "CSR_HEALTH_PATH", "CSR_PREDICT_PATH", "CSR_FEEDBACK_PATH"] {
        cmd.env_remove(var);
    }
    cmd
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = csr().arg("--help").output().expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Credit Scorer"), "Should show app name");
    assert!(stdout.contains("ping"), "Should show ping command");
    assert!(stdout.contains("status"), "Should show status command");
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("feedback"), "Should show feedback command");
    assert!(stdout.contains("--health-path"), "Should show route overrides");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = csr().arg("--version").output().expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("csr"), "Should show binary name");
}

/// Test predict subcommand help lists every applicant field
#[test]
fn test_predict_help() {
    let output = csr()
        .args(["predict", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    for flag in [
        "--duration",
        "--amount",
        "--installment-rate",
        "--residence-since",
        "--age",
        "--existing-credits",
        "--dependents",
    ] {
        assert!(stdout.contains(flag), "Should show {} flag", flag);
    }
}

/// Test that predict refuses to run with fields missing
#[test]
fn test_predict_requires_all_fields() {
    let output = csr()
        .args(["predict", "--duration", "12", "--amount", "1000"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--installment-rate"));
}

/// Test that a missing feedback file fails before contacting the service
#[test]
fn test_feedback_missing_file() {
    let output = csr()
        .args([
            "--api-url",
            "http://127.0.0.1:9",
            "feedback",
            "/nonexistent/feedback.json",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to open feedback file"));
}

/// Test that an unreachable service is reported as an error
#[test]
fn test_ping_unreachable_service() {
    let output = csr()
        .args(["--api-url", "http://127.0.0.1:9", "ping"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to send request"));
}
