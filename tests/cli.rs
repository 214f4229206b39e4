//! Integration tests for the `cmux` binary.
//!
//! These tests run the real binary against a scripted server and check what
//! ends up on stdout, stderr and in the exit status.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use common::{create_temp_dir, reply, unique_socket_path, FakeServer};

const CMUX_BIN: &str = env!("CARGO_BIN_EXE_cmux");

/// A command isolated from the caller's cmux environment and config.
fn cmux_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::new(CMUX_BIN);
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    for key in [
        "CMUX_SOCKET_PATH",
        "CMUX_TAG",
        "CMUXTERM_TAG",
        "CMUX_BUNDLE_ID",
        "CMUXTERM_BUNDLE_ID",
        "CMUX_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("valid path")
}

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("write config");
    path
}

#[test]
fn exec_prints_response() {
    let temp_dir = create_temp_dir();
    let path = unique_socket_path(&temp_dir, "exec");
    let server = FakeServer::start(&path, |line| match line {
        "list_tabs" => reply("* 0: AAA main"),
        _ => reply("ERROR: Unknown command"),
    });

    cmux_cmd(&temp_dir)
        .args(["--socket", path_arg(&path), "exec", "list_tabs"])
        .assert()
        .success()
        .stdout("* 0: AAA main\n");
    assert_eq!(server.received(), vec!["list_tabs"]);
}

#[test]
fn exec_joins_arguments() {
    let temp_dir = create_temp_dir();
    let path = unique_socket_path(&temp_dir, "args");
    let server = FakeServer::replying(&path, "OK");

    cmux_cmd(&temp_dir)
        .args(["exec", "--socket", path_arg(&path)])
        .args(["set_status", "build", "ok", "--tab=T1"])
        .assert()
        .success();
    assert_eq!(server.received(), vec!["set_status build ok --tab=T1"]);
}

#[test]
fn ping_succeeds_on_pong() {
    let temp_dir = create_temp_dir();
    let path = unique_socket_path(&temp_dir, "ping");
    let _server = FakeServer::replying(&path, "PONG");

    cmux_cmd(&temp_dir)
        .args(["--socket", path_arg(&path), "ping"])
        .assert()
        .success()
        .stdout("PONG\n");
}

#[test]
fn ping_fails_on_other_reply() {
    let temp_dir = create_temp_dir();
    let path = unique_socket_path(&temp_dir, "notpong");
    let _server = FakeServer::replying(&path, "busy");

    cmux_cmd(&temp_dir)
        .args(["--socket", path_arg(&path), "ping"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn missing_socket_reports_error() {
    let temp_dir = create_temp_dir();
    let path = unique_socket_path(&temp_dir, "absent");
    let config = write_config(&temp_dir, "[timeouts]\nconnect = \"200ms\"\n");

    cmux_cmd(&temp_dir)
        .args(["--config", path_arg(&config)])
        .args(["--socket", path_arg(&path), "exec", "ping"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Socket not found at"))
        .stderr(predicate::str::contains("Is cmux running?"));
}

#[test]
fn repl_sends_lines_until_quit() {
    let temp_dir = create_temp_dir();
    let path = unique_socket_path(&temp_dir, "repl");
    let server = FakeServer::start(&path, |line| reply(&line.to_uppercase()));

    cmux_cmd(&temp_dir)
        .args(["--socket", path_arg(&path), "repl"])
        .write_stdin("ping\n\nhelp\nquit\nnever_sent\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("> PING"))
        .stdout(predicate::str::contains("> HELP"));
    assert_eq!(server.received(), vec!["ping", "help"]);
}

#[test]
fn resolve_prints_override_and_bundle_id() {
    let temp_dir = create_temp_dir();
    let path = temp_dir.path().join("not-started-yet.sock");

    cmux_cmd(&temp_dir)
        .env("CMUX_SOCKET_PATH", &path)
        .env("CMUX_BUNDLE_ID", "com.example.cmux")
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\ncom.example.cmux\n",
            path.display()
        )));
}

#[test]
fn resolve_reads_socket_section_from_config() {
    let temp_dir = create_temp_dir();
    let config = write_config(&temp_dir, "[socket]\npath = \"/tmp/cmux-cli-test-none.sock\"\n");

    cmux_cmd(&temp_dir)
        .args(["--config", path_arg(&config), "resolve"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("/tmp/cmux-cli-test-none.sock\n"))
        .stdout(predicate::str::ends_with("com.cmuxterm.app.debug\n"));
}

#[test]
fn config_path_uses_xdg_config_home() {
    let temp_dir = create_temp_dir();
    let expected = temp_dir.path().join("cmux").join("config.toml");

    cmux_cmd(&temp_dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{}\n", expected.display())));
}

#[test]
fn config_validate_rejects_bad_duration() {
    let temp_dir = create_temp_dir();
    let config = write_config(&temp_dir, "[timeouts]\ncommand = \"soon\"\n");

    cmux_cmd(&temp_dir)
        .args(["--config", path_arg(&config), "config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeouts.command"));
}

#[test]
fn config_validate_accepts_defaults() {
    let temp_dir = create_temp_dir();

    cmux_cmd(&temp_dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Configuration is valid"));
}
