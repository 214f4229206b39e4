//! Where the client looks for `config.toml`.
//!
//! `$XDG_CONFIG_HOME/cmux` wins on every platform. Without it, Linux uses
//! `~/.config/cmux` and macOS uses `~/Library/Application Support/cmux`.

use std::path::PathBuf;

const APP_NAME: &str = "cmux";

/// Directory holding the client's config file. An empty
/// `XDG_CONFIG_HOME` counts as unset.
pub fn config_dir() -> PathBuf {
    match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_NAME),
        _ => platform_config_dir().join(APP_NAME),
    }
}

fn platform_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::config_dir().unwrap_or_else(|| home_dir().join("Library/Application Support"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        home_dir().join(".config")
    }
}

/// Home directory, or the current directory when it cannot be determined.
fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// `config_dir()/config.toml`.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Expands `~` and `~/...` against the home directory. `~user` forms are
/// left alone.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        home_dir().join(rest)
    } else if path == "~" {
        home_dir()
    } else {
        PathBuf::from(path)
    }
}
