//! Command-line formatting.
//!
//! The server tokenizes each command on spaces and treats every `--*` token
//! as an option until a bare `--`. Free text is therefore escaped so it stays
//! on one line, and trailing text that may itself start with `--` goes after
//! the separator.

use std::fmt::{self, Display};

use crate::commands::types::Target;

/// Escapes raw newlines, carriage returns and tabs as `\n`, `\r`, `\t`.
///
/// The server reverses this before injecting the text.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Wraps `value` in double quotes, escaping backslashes and quotes.
pub fn quote_option_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '\\' || ch == '"' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Reverses [`quote_option_value`]: strips surrounding quotes and backslash
/// escapes. Unquoted input only loses its escapes.
pub fn unquote_option_value(token: &str) -> String {
    let inner = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Quotes `value` only when the server would otherwise split or misread it.
fn quote_if_needed(value: &str) -> String {
    let needs_quoting = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\\');
    if needs_quoting {
        quote_option_value(value)
    } else {
        value.to_string()
    }
}

/// Builder for a single command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    line: String,
}

impl CommandLine {
    /// Starts a command with its name.
    pub fn new(name: &str) -> Self {
        Self {
            line: name.to_string(),
        }
    }

    /// Appends a token as-is.
    pub fn arg(mut self, arg: impl Display) -> Self {
        self.line.push(' ');
        self.line.push_str(&arg.to_string());
        self
    }

    /// Appends a tab or surface reference.
    pub fn target(self, target: impl Into<Target>) -> Self {
        let target: Target = target.into();
        self.arg(target)
    }

    /// Appends a value token, quoted if it contains spaces or quotes.
    pub fn value(self, value: &str) -> Self {
        let quoted = quote_if_needed(&escape_text(value));
        self.arg(quoted)
    }

    /// Appends free text escaped onto one line, unquoted.
    pub fn text(self, text: &str) -> Self {
        let escaped = escape_text(text);
        self.arg(escaped)
    }

    /// Appends `--key=value` when `value` is present.
    pub fn option(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => {
                let value = quote_if_needed(&escape_text(value));
                self.arg(format_args!("--{key}={value}"))
            }
            None => self,
        }
    }

    /// Appends `--key="value"` when `value` is present, always quoted.
    pub fn quoted_option(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => {
                let value = quote_option_value(&escape_text(value));
                self.arg(format_args!("--{key}={value}"))
            }
            None => self,
        }
    }

    /// Ends option parsing with `--` and appends `text` quoted.
    pub fn trailing_text(self, text: &str) -> Self {
        let quoted = quote_option_value(&escape_text(text));
        self.arg("--").arg(quoted)
    }

    /// The finished line, without the newline delimiter.
    pub fn as_str(&self) -> &str {
        &self.line
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}
