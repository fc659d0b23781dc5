// tests/integration_test.rs
use std::fs;
use std::process::Command;

fn npm_release() -> Command {
    Command::new(env!("CARGO_BIN_EXE_npm-release"))
}

fn write_manifest(version: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("Could not create temp dir");
    fs::write(
        dir.path().join("package.json"),
        format!("{{\n  \"name\": \"demo\",\n  \"version\": \"{}\"\n}}\n", version),
    )
    .expect("Could not write package.json");
    dir
}

#[test]
fn test_npm_release_help() {
    let output = npm_release()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("npm-release"));
    assert!(stdout.contains("Bump, tag and publish npm packages"));
    assert!(stdout.contains("--channel"));
}

#[test]
fn test_npm_release_version() {
    let output = npm_release()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_verify_manifest_accepts_release_version() {
    let dir = write_manifest("1.4.0-beta.2");
    let manifest = dir.path().join("package.json");

    let output = npm_release()
        .args(["--verify-manifest", "--manifest"])
        .arg(&manifest)
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("1.4.0-beta.2"));
}

#[test]
fn test_verify_manifest_rejects_dev_version() {
    let dir = write_manifest("1.4.0-dev.20240101120000");
    let manifest = dir.path().join("package.json");

    let output = npm_release()
        .args(["--verify-manifest", "--manifest"])
        .arg(&manifest)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("This PR cannot be merged"));
}

#[test]
fn test_invalid_bump_type_exits_before_touching_repo() {
    let dir = write_manifest("1.0.0");

    let output = npm_release()
        .arg("huge")
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("huge"));
    assert!(stderr.contains("Make sure to run the script through package.json"));
}

#[test]
fn test_invalid_channel_exits() {
    let output = npm_release()
        .args(["patch", "--channel", "nightly"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("nightly"));
}

#[test]
fn test_verify_manifest_fixture_with_dev_version() {
    let output = npm_release()
        .args(["--verify-manifest", "-m", "tests/fixtures/package.json"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("3.4.0-dev.20240315093000"));
}
