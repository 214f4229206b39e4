//! Typed parameters and records for the command facade.

use std::fmt;
use std::str::FromStr;

/// A tab or surface, addressed by position or by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Zero-based position.
    Index(usize),
    /// Server-assigned identifier.
    Id(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Index(index) => write!(f, "{}", index),
            Target::Id(id) => write!(f, "{}", id),
        }
    }
}

impl From<usize> for Target {
    fn from(index: usize) -> Self {
        Target::Index(index)
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Target::Id(id.to_string())
    }
}

impl From<String> for Target {
    fn from(id: String) -> Self {
        Target::Id(id)
    }
}

impl From<&String> for Target {
    fn from(id: &String) -> Self {
        Target::Id(id.clone())
    }
}

/// Where a new split opens relative to the focused surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    /// To the left.
    Left,
    /// To the right.
    Right,
    /// Above.
    Up,
    /// Below.
    Down,
}

impl fmt::Display for SplitDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SplitDirection::Left => "left",
            SplitDirection::Right => "right",
            SplitDirection::Up => "up",
            SplitDirection::Down => "down",
        };
        write!(f, "{}", s)
    }
}

/// Error type for parsing SplitDirection from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSplitDirectionError(pub String);

impl fmt::Display for ParseSplitDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid split direction: {}", self.0)
    }
}

impl std::error::Error for ParseSplitDirectionError {}

impl FromStr for SplitDirection {
    type Err = ParseSplitDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(SplitDirection::Left),
            "right" => Ok(SplitDirection::Right),
            "up" => Ok(SplitDirection::Up),
            "down" => Ok(SplitDirection::Down),
            _ => Err(ParseSplitDirectionError(s.to_string())),
        }
    }
}

/// One row of `list_tabs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    /// Position in the tab bar.
    pub index: usize,
    /// Tab identifier.
    pub id: String,
    /// Tab title, possibly empty.
    pub title: String,
    /// Whether this is the selected tab.
    pub selected: bool,
}

/// One row of `list_surfaces`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    /// Position within the tab.
    pub index: usize,
    /// Surface identifier.
    pub id: String,
    /// Whether this surface has focus.
    pub focused: bool,
}

/// One row of `list_notifications`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Notification identifier.
    pub id: String,
    /// Tab the notification belongs to.
    pub tab_id: String,
    /// Surface the notification belongs to, if any.
    pub surface_id: Option<String>,
    /// Whether the user has seen it.
    pub is_read: bool,
    /// Title line.
    pub title: String,
    /// Subtitle line, possibly empty.
    pub subtitle: String,
    /// Body text, possibly empty.
    pub body: String,
}

/// One row of `list_log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Severity as reported by the server, e.g. `info` or `warning`.
    pub level: String,
    /// Message text, verbatim.
    pub message: String,
    /// Reporting source, when one was given.
    pub source: Option<String>,
}
