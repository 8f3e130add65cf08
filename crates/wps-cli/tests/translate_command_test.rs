use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn testdata_path(path: &str) -> PathBuf {
    repo_root().join("testdata").join(path)
}

fn wps() -> Command {
    Command::new(env!("CARGO_BIN_EXE_wps"))
}

#[test]
fn translate_writes_each_input_into_out_dir() {
    let out_dir = tempfile::tempdir().expect("create temp dir");
    let inputs = [
        testdata_path("wps/legacy_capabilities.xml"),
        testdata_path("wps/legacy_process_descriptions.xml"),
    ];

    let output = wps()
        .arg("translate")
        .args(&inputs)
        .args(["--to", "current", "--out-dir"])
        .arg(out_dir.path())
        .output()
        .expect("run wps translate");

    assert!(
        output.status.success(),
        "expected translate to succeed; stdout: {}; stderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    let capabilities = fs::read_to_string(out_dir.path().join("legacy_capabilities.xml"))
        .expect("translated capabilities should exist");
    assert!(capabilities.contains("Contents"));
    assert!(capabilities.contains("ProcessSummary"));
    assert!(capabilities.contains(r#"version="2.0.0""#));

    let descriptions = fs::read_to_string(out_dir.path().join("legacy_process_descriptions.xml"))
        .expect("translated descriptions should exist");
    assert!(descriptions.contains("ProcessOffering"));
    assert!(!descriptions.contains("ComplexOutput"));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 2);
}

#[test]
fn translate_with_bind_uses_the_model() {
    let out_dir = tempfile::tempdir().expect("create temp dir");
    let input = testdata_path("wps/current_result.xml");

    let output = wps()
        .arg("translate")
        .arg(&input)
        .args(["--to", "legacy", "--bind", "--out-dir"])
        .arg(out_dir.path())
        .output()
        .expect("run wps translate --bind");

    assert!(output.status.success());
    let xml = fs::read_to_string(out_dir.path().join("current_result.xml"))
        .expect("converted result should exist");
    assert!(xml.contains("ExecuteResponse"));
    assert!(xml.contains("ProcessOutputs"));
}

#[test]
fn translate_reports_failures_with_non_zero_exit() {
    let out_dir = tempfile::tempdir().expect("create temp dir");

    let output = wps()
        .arg("translate")
        .arg(testdata_path("wps/legacy_capabilities.xml"))
        .arg(out_dir.path().join("missing.xml"))
        .args(["--to", "current", "--out-dir"])
        .arg(out_dir.path().join("out"))
        .output()
        .expect("run wps translate");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.xml"), "stderr: {stderr}");
    assert!(stderr.contains("1 of 2 documents failed"), "stderr: {stderr}");
    assert!(out_dir.path().join("out/legacy_capabilities.xml").exists());
}

#[test]
fn translate_rejects_unknown_version() {
    let out_dir = tempfile::tempdir().expect("create temp dir");

    let output = wps()
        .arg("translate")
        .arg(testdata_path("wps/legacy_capabilities.xml"))
        .args(["--to", "3.0", "--out-dir"])
        .arg(out_dir.path())
        .output()
        .expect("run wps translate");

    assert_eq!(output.status.code(), Some(2), "expected clap usage error");
}

#[test]
fn translate_applies_rules_from_config() {
    let out_dir = tempfile::tempdir().expect("create temp dir");

    let output = wps()
        .arg("--config")
        .arg(testdata_path("config/wps.yaml"))
        .arg("translate")
        .arg(testdata_path("wps/legacy_execute_response.xml"))
        .args(["--to", "current", "--out-dir"])
        .arg(out_dir.path())
        .output()
        .expect("run wps translate");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let xml = fs::read_to_string(out_dir.path().join("legacy_execute_response.xml"))
        .expect("translated response should exist");
    assert!(xml.contains("StatusInfo"));
}
