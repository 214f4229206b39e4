//! Reads `config.toml` into [`Config`].
//!
//! An explicitly requested file must exist. The default location is
//! optional: with no file there, every setting takes its default.

use std::fs;
use std::io;
use std::path::Path;

use crate::config::error::ConfigError;
use crate::config::schema::Config;
use crate::config::xdg;

/// Stateless configuration loader.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `explicit` if given, otherwise the default location.
    ///
    /// This is what the CLI's `--config` flag maps to.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Self::load_default(),
        }
    }

    /// Loads a specific file.
    ///
    /// A missing file is [`ConfigError::NotFound`]; any other I/O failure is
    /// [`ConfigError::ReadError`].
    pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let config = Self::parse_toml(&content, path)?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Loads `$XDG_CONFIG_HOME/cmux/config.toml`, or defaults when absent.
    pub fn load_default() -> Result<Config, ConfigError> {
        let path = xdg::config_path();
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Config::default());
        }
        Self::load_from_path(&path)
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(content).map_err(|e| {
            let (line, column) = e
                .span()
                .map(|span| line_column(content, span.start))
                .unwrap_or((0, 0));
            ConfigError::ParseError {
                path: path.to_path_buf(),
                line,
                column,
                message: e.message().to_string(),
            }
        })
    }
}

/// One-based line and column of byte `offset` in `content`.
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let before = &content[..offset.min(content.len())];
    let line_start = before.rfind('\n').map_or(0, |p| p + 1);
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    (line, offset - line_start + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;
    use serial_test::serial;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Points `XDG_CONFIG_HOME` at `dir` for the duration of `f`.
    fn with_config_home<F: FnOnce()>(dir: &TempDir, f: F) {
        let saved = std::env::var("XDG_CONFIG_HOME").ok();
        std::env::set_var("XDG_CONFIG_HOME", dir.path());
        f();
        match saved {
            Some(v) => std::env::set_var("XDG_CONFIG_HOME", v),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    fn write_file(dir: &TempDir, relative: &str, content: &str) -> PathBuf {
        let path = dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, content).expect("failed to write config");
        path
    }

    #[test]
    fn line_column_is_one_based() {
        let text = "a = 1\nbb = ?\n";
        assert_eq!(line_column(text, 0), (1, 1));
        assert_eq!(line_column(text, 6), (2, 1));
        assert_eq!(line_column(text, 11), (2, 6));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = ConfigLoader::parse_toml("[socket]\ntag = \"ci\"\n", Path::new("p.toml"))
            .expect("partial config should parse");
        assert_eq!(config.socket.tag.as_deref(), Some("ci"));
        assert_eq!(config.log.level, LogLevel::Warn);
        let timeouts = config.timeouts.to_timeouts().expect("default timeouts");
        assert_eq!(timeouts.connect, Duration::from_secs(2));
    }

    #[test]
    fn syntax_error_reports_position() {
        let err = ConfigLoader::parse_toml("[timeouts]\nio = \n", Path::new("bad.toml"))
            .expect_err("should fail");
        match err {
            ConfigError::ParseError {
                path,
                line,
                column,
                message,
            } => {
                assert_eq!(path, PathBuf::from("bad.toml"));
                assert!(line >= 2, "error is past the section header");
                assert!(column > 0);
                assert!(!message.is_empty());
            }
            other => panic!("expected ParseError, got: {other:?}"),
        }
    }

    #[test]
    fn numeric_timeout_is_a_type_error() {
        let err = ConfigLoader::parse_toml("[timeouts]\nconnect = 42\n", Path::new("t.toml"))
            .expect_err("durations are strings");
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = dir.path().join("absent.toml");
        match ConfigLoader::load(Some(&path)).expect_err("should fail") {
            ConfigError::NotFound { path: p } => assert_eq!(p, path),
            other => panic!("expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn explicit_directory_is_read_error() {
        let dir = TempDir::new().expect("failed to create temp dir");
        match ConfigLoader::load_from_path(dir.path()).expect_err("should fail") {
            ConfigError::ReadError { path, .. } => assert_eq!(path, dir.path()),
            other => panic!("expected ReadError, got: {other:?}"),
        }
    }

    #[test]
    fn explicit_file_is_parsed() {
        let dir = TempDir::new().expect("failed to create temp dir");
        let path = write_file(&dir, "custom.toml", "[log]\nlevel = \"trace\"\n");
        let config = ConfigLoader::load(Some(&path)).expect("should load");
        assert_eq!(config.log.level, LogLevel::Trace);
    }

    #[test]
    #[serial]
    fn default_location_may_be_absent() {
        let dir = TempDir::new().expect("failed to create temp dir");
        with_config_home(&dir, || {
            let config = ConfigLoader::load(None).expect("should return defaults");
            assert_eq!(config, Config::default());
        });
    }

    #[test]
    #[serial]
    fn default_location_is_read_when_present() {
        let dir = TempDir::new().expect("failed to create temp dir");
        write_file(&dir, "cmux/config.toml", "[socket]\ntemp_dir = \"/var/tmp\"\n");
        with_config_home(&dir, || {
            let config = ConfigLoader::load_default().expect("should load");
            assert_eq!(config.socket.temp_dir.as_deref(), Some("/var/tmp"));
        });
    }
}
