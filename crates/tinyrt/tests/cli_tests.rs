//! Integration tests for the tinyrt command line

#![allow(deprecated)] // cargo_bin is deprecated in newer assert_cmd releases

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tinyrt_testkit::temp_dir_in_workspace;

/// tinyrt with an isolated home and none of the ambient skip flags
fn tinyrt(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tinyrt").unwrap();
    cmd.current_dir(dir)
        .env("TINYRT_HOME", dir.join("home"))
        .env("TMPDIR", dir)
        .env_remove("CI")
        .env_remove("TINYRT_SKIP_INSTALL")
        .env_remove("TINYRT_TARGET_ARCH")
        .env_remove("TINYRT_TARGET_PLATFORM")
        .env_remove("TINYRT_PORTABLE")
        .env_remove("TINYRT_NODE_MIRROR")
        .env_remove("TINYRT_PYTHON_MIRROR")
        .env_remove("TINYRT_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let temp = temp_dir_in_workspace();

    tinyrt(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("ensure-ready"));
}

#[test]
fn test_resolve_node_json() {
    let temp = temp_dir_in_workspace();

    let output = tinyrt(temp.path())
        .args(["resolve", "node", "--platform", "linux", "--arch", "arm64", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "node");
    assert_eq!(json["platform_token"], "linux-arm64");
    assert_eq!(json["file_name"], "node-v22.9.0-linux-arm64.tar.gz");
    assert_eq!(json["archive_kind"], "tar-gz");
    assert_eq!(
        json["url"],
        "https://nodejs.org/dist/v22.9.0/node-v22.9.0-linux-arm64.tar.gz"
    );
    assert_eq!(json["top_level_dir"], "node-v22.9.0-linux-arm64");
}

#[test]
fn test_resolve_python_windows() {
    let temp = temp_dir_in_workspace();

    tinyrt(temp.path())
        .args(["resolve", "python", "--platform", "win32", "--arch", "x64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("python-3.10.0-embed-amd64.zip"))
        .stdout(predicate::str::contains("win-amd64"));
}

#[test]
fn test_resolve_uses_env_target() {
    let temp = temp_dir_in_workspace();

    tinyrt(temp.path())
        .env("TINYRT_TARGET_PLATFORM", "darwin")
        .env("TINYRT_TARGET_ARCH", "arm64")
        .args(["resolve", "python"])
        .assert()
        .success()
        .stdout(predicate::str::contains("python-3.10.0-macos-arm64.tar.gz"));
}

#[test]
fn test_resolve_unsupported_platform_fails() {
    let temp = temp_dir_in_workspace();

    tinyrt(temp.path())
        .args(["resolve", "node", "--platform", "aix", "--arch", "ppc64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("UNSUPPORTED_PLATFORM"))
        .stderr(predicate::str::contains("aix"))
        .stderr(predicate::str::contains("ppc64"));
}

#[test]
fn test_resolve_reads_config_file() {
    let temp = temp_dir_in_workspace();
    fs::write(
        temp.path().join("tinyrt.toml"),
        "[node]\nversion = \"20.11.1\"\nplatform = \"linux\"\narch = \"x64\"\n",
    )
    .unwrap();

    tinyrt(temp.path())
        .args(["resolve", "node"])
        .assert()
        .success()
        .stdout(predicate::str::contains("node-v20.11.1-linux-x64.tar.gz"));
}

#[test]
fn test_config_file_target_beats_env() {
    let temp = temp_dir_in_workspace();
    fs::write(
        temp.path().join("tinyrt.toml"),
        "[python]\nplatform = \"linux\"\narch = \"x64\"\n",
    )
    .unwrap();

    tinyrt(temp.path())
        .env("TINYRT_TARGET_PLATFORM", "darwin")
        .env("TINYRT_TARGET_ARCH", "arm64")
        .args(["resolve", "python"])
        .assert()
        .success()
        .stdout(predicate::str::contains("python-3.10.0-linux-x64.tar.gz"));
}

#[test]
fn test_version_flag_overrides_config_file() {
    let temp = temp_dir_in_workspace();
    let config = temp.path().join("custom.toml");
    fs::write(&config, "[python]\nversion = \"3.11.0\"\n").unwrap();

    tinyrt(temp.path())
        .args(["--config"])
        .arg(&config)
        .args(["resolve", "python", "--version", "3.12.2", "--platform", "linux"])
        .assert()
        .success()
        .stdout(predicate::str::contains("python-3.12.2-linux-"));
}

#[test]
fn test_invalid_config_file_fails() {
    let temp = temp_dir_in_workspace();
    fs::write(temp.path().join("tinyrt.toml"), "[node]\nunknown_key = 1\n").unwrap();

    tinyrt(temp.path())
        .args(["resolve", "node"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_INVALID"));
}

#[test]
fn test_unknown_kind_is_rejected() {
    let temp = temp_dir_in_workspace();

    tinyrt(temp.path())
        .args(["status", "ruby"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ruby"));
}

#[test]
fn test_status_not_installed_json() {
    let temp = temp_dir_in_workspace();

    let output = tinyrt(temp.path())
        .args(["status", "python", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kind"], "python");
    assert_eq!(json["version"], "3.10.0");
    assert_eq!(json["installed"], false);
    assert!(
        json["runtime_path"]
            .as_str()
            .unwrap()
            .ends_with(&format!("python{}3.10.0", std::path::MAIN_SEPARATOR))
    );
}

#[test]
fn test_exec_without_install_fails() {
    let temp = temp_dir_in_workspace();
    let script = temp.path().join("hello.js");
    fs::write(&script, "console.log('hello')").unwrap();

    tinyrt(temp.path())
        .args(["exec", "node"])
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("NOT_INSTALLED"));
}

#[test]
fn test_exec_missing_file_fails() {
    let temp = temp_dir_in_workspace();

    tinyrt(temp.path())
        .args(["exec", "python", "does-not-exist.py"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.py"));
}

#[test]
fn test_ensure_ready_skipped_by_env() {
    let temp = temp_dir_in_workspace();

    tinyrt(temp.path())
        .env("TINYRT_SKIP_INSTALL", "true")
        .arg("ensure-ready")
        .assert()
        .success()
        .stdout(predicate::str::contains("node skipped"))
        .stdout(predicate::str::contains("python skipped"));

    assert!(!temp.path().join("home").exists());
}

#[test]
fn test_ensure_ready_skipped_in_ci() {
    let temp = temp_dir_in_workspace();

    tinyrt(temp.path())
        .env("CI", "true")
        .args(["ensure-ready", "python"])
        .assert()
        .success()
        .stdout(predicate::str::contains("python skipped"))
        .stdout(predicate::str::contains("node").not());
}

#[test]
fn test_ensure_ready_never_fails() {
    let temp = temp_dir_in_workspace();

    tinyrt(temp.path())
        .env("TINYRT_TARGET_PLATFORM", "aix")
        .args(["ensure-ready", "node"])
        .assert()
        .success()
        .stdout(predicate::str::contains("node failed"))
        .stdout(predicate::str::contains("UNSUPPORTED_PLATFORM"));
}

#[test]
#[cfg(unix)]
fn test_install_and_exec_from_mirror() {
    use tinyrt_testkit::FakeRuntime;

    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v22.9.0/node-v22.9.0-linux-x64.tar.gz")
        .with_status(200)
        .with_body(FakeRuntime::node("v22.9.0", "linux-x64").tar_gz())
        .expect(1)
        .create();

    let temp = temp_dir_in_workspace();
    let selector = ["--platform", "linux", "--arch", "x64"];

    tinyrt(temp.path())
        .env("TINYRT_NODE_MIRROR", server.url())
        .args(["install", "node"])
        .args(selector)
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed to"));

    tinyrt(temp.path())
        .env("TINYRT_NODE_MIRROR", server.url())
        .args(["install", "node"])
        .args(selector)
        .assert()
        .success()
        .stdout(predicate::str::contains("already installed"));

    mock.assert();

    let script = temp.path().join("program.js");
    fs::write(&script, "echo from-cli\necho note >&2\n").unwrap();

    tinyrt(temp.path())
        .args(["exec", "node"])
        .arg(&script)
        .args(selector)
        .assert()
        .success()
        .stdout("from-cli\n")
        .stderr(predicate::str::contains("note"));

    tinyrt(temp.path())
        .args(["exec", "node"])
        .args(selector)
        .write_stdin("exit 4\n")
        .assert()
        .code(4);

    tinyrt(temp.path())
        .args(["status", "node"])
        .args(selector)
        .assert()
        .success()
        .stdout(predicate::str::contains("installed"))
        .stdout(predicate::str::contains("not installed").not());
}
