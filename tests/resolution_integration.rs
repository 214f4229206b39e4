//! Integration tests for socket resolution
//!
//! These tests lay out socket files in a private temp directory and check
//! which one a client ends up talking to.

mod common;

use std::fs;
use std::os::unix::net::UnixListener;
use std::time::Duration;

use cmux_client::locator::{ProbePolicy, ENV_SOCKET_PATH, ENV_TAG};
use cmux_client::{Client, Commands, LocatorConfig, SocketLocator};
use common::{create_temp_dir, FakeServer};
use serial_test::serial;
use tempfile::TempDir;

const QUICK: ProbePolicy = ProbePolicy {
    attempt_timeout: Duration::from_millis(100),
    attempts: 2,
    backoff: Duration::from_millis(10),
};

fn config_in(dir: &TempDir) -> LocatorConfig {
    LocatorConfig {
        probe: QUICK,
        discovery_probe: QUICK,
        ..LocatorConfig::default()
    }
    .with_temp_dir(dir.path())
}

fn leave_stale_socket(dir: &TempDir, name: &str) {
    drop(UnixListener::bind(dir.path().join(name)).expect("bind"));
}

#[test]
fn test_client_reaches_live_default_over_tagged_glob_match() {
    let dir = create_temp_dir();
    let _tagged = FakeServer::replying(&dir.path().join("cmuxterm-debug-feature.sock"), "tagged");
    let _release = FakeServer::replying(&dir.path().join("cmuxterm.sock"), "PONG");

    let locator = SocketLocator::new(config_in(&dir));
    let mut client = Client::with_locator(&locator);
    assert_eq!(client.socket_path(), dir.path().join("cmuxterm.sock"));

    client.connect().expect("connect");
    assert!(client.ping().expect("ping"));
}

#[test]
fn test_client_discovers_tagged_socket_when_defaults_are_stale() {
    let dir = create_temp_dir();
    leave_stale_socket(&dir, "cmuxterm-debug.sock");
    leave_stale_socket(&dir, "cmuxterm.sock");
    let _tagged = FakeServer::replying(&dir.path().join("cmuxterm-debug-wip.sock"), "PONG");

    let mut client = Client::with_locator(&SocketLocator::new(config_in(&dir)));
    assert_eq!(client.socket_path(), dir.path().join("cmuxterm-debug-wip.sock"));
    client.connect().expect("connect");
    assert!(client.ping().expect("ping"));
}

#[test]
fn test_tag_slug_selects_tagged_instance() {
    let dir = create_temp_dir();
    let _debug = FakeServer::replying(&dir.path().join("cmuxterm-debug.sock"), "debug");
    let _tagged = FakeServer::replying(&dir.path().join("cmuxterm-debug-foo-bar.sock"), "PONG");

    let mut config = config_in(&dir);
    config.tag = Some("foo bar!".to_string());
    let locator = SocketLocator::new(config);
    assert_eq!(locator.resolve(), dir.path().join("cmuxterm-debug-foo-bar.sock"));
    assert_eq!(locator.bundle_id(), "com.cmuxterm.app.debug.foo.bar");
}

#[test]
fn test_marker_file_points_at_live_socket() {
    let dir = create_temp_dir();
    let elsewhere = create_temp_dir();
    let target = elsewhere.path().join("custom.sock");
    let _server = FakeServer::replying(&target, "PONG");

    let config = config_in(&dir);
    fs::write(&config.last_socket_file, format!("{}\n", target.display())).expect("write marker");

    assert_eq!(SocketLocator::new(config).resolve(), target);
}

#[test]
fn test_nothing_running_falls_back_to_debug_default() {
    let dir = create_temp_dir();
    let locator = SocketLocator::new(config_in(&dir));
    assert_eq!(locator.resolve(), dir.path().join("cmuxterm-debug.sock"));
}

#[test]
#[serial]
fn test_environment_override_is_used() {
    let dir = create_temp_dir();
    let path = dir.path().join("from-env.sock");
    let _server = FakeServer::replying(&path, "PONG");

    let saved_path = std::env::var(ENV_SOCKET_PATH).ok();
    let saved_tags: Vec<_> = ENV_TAG.iter().map(|k| std::env::var(k).ok()).collect();
    std::env::set_var(ENV_SOCKET_PATH, &path);
    for key in ENV_TAG {
        std::env::remove_var(key);
    }

    let config = LocatorConfig::from_env();
    let resolved = SocketLocator::new(LocatorConfig {
        probe: QUICK,
        ..config
    })
    .resolve();

    match saved_path {
        Some(v) => std::env::set_var(ENV_SOCKET_PATH, v),
        None => std::env::remove_var(ENV_SOCKET_PATH),
    }
    for (key, value) in ENV_TAG.iter().zip(saved_tags) {
        if let Some(v) = value {
            std::env::set_var(key, v);
        }
    }

    assert_eq!(resolved, path);
}
