//! Socket discovery.
//!
//! Several cmux instances can run side by side (a release build, a debug
//! build, tagged builds started by test harnesses), each listening on its own
//! socket in the shared temp directory. [`SocketLocator`] picks the one a
//! client should talk to, preferring explicit hints and skipping stale socket
//! files that no longer have a listener behind them.
//!
//! Resolution order, first hit wins:
//!
//! 1. Tag (`CMUX_TAG`): `cmuxterm-debug-<slug>.sock`, then `cmuxterm-<slug>.sock`.
//!    Live beats existing, existing beats missing; with nothing on disk the
//!    debug-style name is returned so connect can wait for it.
//! 2. Override (`CMUX_SOCKET_PATH`): used when live, or when it does not exist
//!    yet. A stale override falls through.
//! 3. The path recorded in the last-socket marker file, if live.
//! 4. `cmuxterm-debug.sock`, then `cmuxterm.sock`, if live.
//! 5. The newest live `cmuxterm-debug-*.sock`.
//! 6. `cmuxterm-debug.sock`, unconfirmed.
//!
//! The locator only stats files and probes sockets. It never reads process
//! state; environment hints arrive through [`LocatorConfig`].

mod probe;


pub use probe::{is_live, ProbePolicy};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use globset::Glob;

use crate::config::schema::SocketConfig;
use crate::config::xdg::expand_tilde;

/// Shared directory all cmux sockets live in.
pub const DEFAULT_TEMP_DIR: &str = "/tmp";

/// Marker file recording the most recently used socket path.
pub const LAST_SOCKET_FILE_NAME: &str = "cmuxterm-last-socket-path";

/// Bundle identifier of an untagged debug build.
pub const DEFAULT_DEBUG_BUNDLE_ID: &str = "com.cmuxterm.app.debug";

/// Untagged socket names, in preference order.
pub const DEFAULT_SOCKET_NAMES: [&str; 2] = ["cmuxterm-debug.sock", "cmuxterm.sock"];

/// File-name pattern of sockets created by tagged debug builds.
pub const TAGGED_DEBUG_PATTERN: &str = "cmuxterm-debug-*.sock";

/// Explicit socket path override.
pub const ENV_SOCKET_PATH: &str = "CMUX_SOCKET_PATH";

/// Tag variables, in precedence order.
pub const ENV_TAG: [&str; 2] = ["CMUX_TAG", "CMUXTERM_TAG"];

/// Bundle id override variables, in precedence order.
pub const ENV_BUNDLE_ID: [&str; 2] = ["CMUX_BUNDLE_ID", "CMUXTERM_BUNDLE_ID"];

/// Inputs to socket resolution.
///
/// Build one with [`LocatorConfig::from_env`] in production code, or set the
/// fields directly in tests so resolution stays deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorConfig {
    /// Instance tag used to namespace socket names.
    pub tag: Option<String>,
    /// Explicit socket path chosen by the caller.
    pub socket_override: Option<PathBuf>,
    /// Explicit bundle identifier.
    pub bundle_id: Option<String>,
    /// Directory holding the sockets.
    pub temp_dir: PathBuf,
    /// Marker file naming the last socket used.
    pub last_socket_file: PathBuf,
    /// Probe timing for explicit candidates.
    pub probe: ProbePolicy,
    /// Probe timing for globbed candidates.
    pub discovery_probe: ProbePolicy,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        let temp_dir = PathBuf::from(DEFAULT_TEMP_DIR);
        Self {
            tag: None,
            socket_override: None,
            bundle_id: None,
            last_socket_file: temp_dir.join(LAST_SOCKET_FILE_NAME),
            temp_dir,
            probe: ProbePolicy::STANDARD,
            discovery_probe: ProbePolicy::DISCOVERY,
        }
    }
}

impl LocatorConfig {
    /// Reads hints from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads hints through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(key))
                .find(|value| !value.is_empty())
        };

        Self {
            tag: first(&ENV_TAG),
            socket_override: first(&[ENV_SOCKET_PATH]).map(PathBuf::from),
            bundle_id: first(&ENV_BUNDLE_ID),
            ..Self::default()
        }
    }

    /// Fills hints the environment left unset from the `[socket]` config section.
    pub fn merge_file(mut self, file: &SocketConfig) -> Self {
        if let Some(dir) = file.temp_dir.as_deref().filter(|d| !d.is_empty()) {
            self = self.with_temp_dir(expand_tilde(dir));
        }
        if self.tag.is_none() {
            self.tag = file.tag.clone().filter(|t| !t.is_empty());
        }
        if self.socket_override.is_none() {
            self.socket_override = file
                .path
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(expand_tilde);
        }
        if self.bundle_id.is_none() {
            self.bundle_id = file.bundle_id.clone().filter(|b| !b.is_empty());
        }
        self
    }

    /// Moves the socket directory, and the marker file along with it.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self.last_socket_file = self.temp_dir.join(LAST_SOCKET_FILE_NAME);
        self
    }
}

/// Picks the socket a client should connect to.
#[derive(Debug, Clone)]
pub struct SocketLocator {
    config: LocatorConfig,
}

impl SocketLocator {
    /// Creates a locator over an explicit configuration.
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Creates a locator from the process environment.
    pub fn from_env() -> Self {
        Self::new(LocatorConfig::from_env())
    }

    /// The configuration this locator resolves against.
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Tagged candidates for `tag`, debug-style name first.
    pub fn tagged_candidates(&self, tag: &str) -> [PathBuf; 2] {
        let slug = sanitize_tag_slug(tag);
        [
            self.config
                .temp_dir
                .join(format!("cmuxterm-debug-{slug}.sock")),
            self.config.temp_dir.join(format!("cmuxterm-{slug}.sock")),
        ]
    }

    /// Untagged candidates, debug-style name first.
    pub fn default_candidates(&self) -> [PathBuf; 2] {
        DEFAULT_SOCKET_NAMES.map(|name| self.config.temp_dir.join(name))
    }

    /// Resolves the socket path.
    ///
    /// Always returns a path. When nothing could be confirmed live the
    /// result is a best guess and [`crate::Connection::connect`] reports the
    /// failure if the server never shows up.
    pub fn resolve(&self) -> PathBuf {
        if let Some(tag) = &self.config.tag {
            let path = self.resolve_tagged(tag);
            tracing::debug!("Resolved tagged socket {:?} for tag {:?}", path, tag);
            return path;
        }

        let steps: [(&str, fn(&Self) -> Option<PathBuf>); 4] = [
            ("override", Self::resolve_override),
            ("last-socket marker", Self::resolve_last_socket),
            ("default", Self::resolve_default),
            ("discovered", Self::resolve_discovered),
        ];
        for (step, resolve) in steps {
            if let Some(path) = resolve(self) {
                tracing::debug!("Resolved {} socket {:?}", step, path);
                return path;
            }
        }

        let [fallback, _] = self.default_candidates();
        tracing::debug!("No live socket found, falling back to {:?}", fallback);
        fallback
    }

    /// Bundle identifier of the app instance this configuration targets.
    pub fn bundle_id(&self) -> String {
        default_bundle_id(&self.config)
    }

    fn live(&self, path: &Path) -> bool {
        path.exists() && is_live(path, self.config.probe)
    }

    fn resolve_tagged(&self, tag: &str) -> PathBuf {
        let candidates = self.tagged_candidates(tag);
        if let Some(path) = candidates.iter().find(|p| self.live(p)) {
            return path.clone();
        }
        // The app may still be starting: an existing file is a better guess
        // than a name nobody created.
        if let Some(path) = candidates.iter().find(|p| p.exists()) {
            return path.clone();
        }
        let [debug, _] = candidates;
        debug
    }

    fn resolve_override(&self) -> Option<PathBuf> {
        let path = self.config.socket_override.as_ref()?;
        if !path.exists() {
            return Some(path.clone());
        }
        if is_live(path, self.config.probe) {
            return Some(path.clone());
        }
        tracing::debug!("Override {:?} is stale, trying other candidates", path);
        None
    }

    fn resolve_last_socket(&self) -> Option<PathBuf> {
        let path = read_last_socket_path(&self.config.last_socket_file)?;
        self.live(&path).then_some(path)
    }

    fn resolve_default(&self) -> Option<PathBuf> {
        self.default_candidates()
            .into_iter()
            .find(|path| self.live(path))
    }

    fn resolve_discovered(&self) -> Option<PathBuf> {
        let matcher = match Glob::new(TAGGED_DEBUG_PATTERN) {
            Ok(glob) => glob.compile_matcher(),
            Err(e) => {
                tracing::warn!("Invalid discovery pattern {}: {}", TAGGED_DEBUG_PATTERN, e);
                return None;
            }
        };
        let entries = match fs::read_dir(&self.config.temp_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot scan {:?}: {}", self.config.temp_dir, e);
                return None;
            }
        };

        let mut found: Vec<(SystemTime, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| matcher.is_match(entry.file_name()))
            .filter_map(|entry| {
                let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
                Some((modified, entry.path()))
            })
            .collect();
        found.sort_by(|a, b| b.0.cmp(&a.0));

        found
            .into_iter()
            .map(|(_, path)| path)
            .find(|path| is_live(path, self.config.discovery_probe))
    }
}

/// Reads the marker file, returning `None` when it is missing or blank.
pub fn read_last_socket_path(marker: &Path) -> Option<PathBuf> {
    let content = fs::read_to_string(marker).ok()?;
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Normalizes a tag for use in socket names: `"foo bar!"` becomes `"foo-bar"`.
pub fn sanitize_tag_slug(raw: &str) -> String {
    collapse_non_alphanumeric(raw, '-')
}

/// Normalizes a tag for use as a bundle id suffix: `"Foo Bar"` becomes `"foo.bar"`.
pub fn sanitize_bundle_suffix(raw: &str) -> String {
    collapse_non_alphanumeric(raw, '.')
}

/// Lowercases `raw`, joins `[a-z0-9]` runs with a single `separator`, and
/// falls back to `agent` when nothing is left.
fn collapse_non_alphanumeric(raw: &str, separator: char) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;
    for ch in raw.trim().to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_separator && !out.is_empty() {
                out.push(separator);
            }
            pending_separator = false;
            out.push(ch);
        } else {
            pending_separator = true;
        }
    }
    if out.is_empty() {
        "agent".to_string()
    } else {
        out
    }
}

/// Bundle identifier for the configured instance.
pub fn default_bundle_id(config: &LocatorConfig) -> String {
    if let Some(id) = &config.bundle_id {
        return id.clone();
    }
    match &config.tag {
        Some(tag) => format!(
            "{DEFAULT_DEBUG_BUNDLE_ID}.{}",
            sanitize_bundle_suffix(tag)
        ),
        None => DEFAULT_DEBUG_BUNDLE_ID.to_string(),
    }
}
