//! Response classification and listing parsers.

use crate::commands::types::{LogEntry, Notification, Surface, Tab};
use crate::error::{Error, Result};

const SUCCESS_MARKER: &str = "OK";

/// Returns the payload after `OK`, or the whole response as a protocol error.
pub(crate) fn expect_ok(response: String) -> Result<String> {
    match response.strip_prefix(SUCCESS_MARKER) {
        Some(payload) => Ok(payload.strip_prefix(' ').unwrap_or(payload).to_string()),
        None => Err(Error::Protocol(response)),
    }
}

/// Like [`expect_ok`], but the payload must be non-empty.
pub(crate) fn expect_ok_payload(response: String) -> Result<String> {
    match response.strip_prefix("OK ") {
        Some(payload) if !payload.is_empty() => Ok(payload.to_string()),
        _ => Err(Error::Protocol(response)),
    }
}

/// Fails on responses that carry an `ERROR` line instead of data.
pub(crate) fn reject_error(response: String) -> Result<String> {
    if response.starts_with("ERROR") {
        Err(Error::Protocol(response))
    } else {
        Ok(response)
    }
}

fn non_blank_lines(response: &str) -> impl Iterator<Item = &str> {
    response.split('\n').filter(|line| !line.trim().is_empty())
}

/// Splits a leading `*` selection marker off a listing row.
fn selection(line: &str) -> (bool, &str) {
    let selected = line.starts_with('*');
    (selected, line.trim_start_matches(|c| c == '*' || c == ' '))
}

fn parse_index(token: &str, line: &str) -> Result<usize> {
    token
        .trim_end_matches(':')
        .parse()
        .map_err(|_| Error::Protocol(format!("malformed listing row: {line}")))
}

pub(crate) fn parse_tabs(response: &str) -> Result<Vec<Tab>> {
    if response == "No tabs" {
        return Ok(Vec::new());
    }
    if response.starts_with("ERROR") {
        return Err(Error::Protocol(response.to_string()));
    }

    let mut tabs = Vec::new();
    for line in non_blank_lines(response) {
        let (selected, rest) = selection(line);
        let parts: Vec<&str> = rest.splitn(3, ' ').collect();
        if let [index, id, title] = parts[..] {
            tabs.push(Tab {
                index: parse_index(index, line)?,
                id: id.to_string(),
                title: title.to_string(),
                selected,
            });
        }
    }
    Ok(tabs)
}

pub(crate) fn parse_surfaces(response: &str) -> Result<Vec<Surface>> {
    if matches!(response, "No surfaces" | "ERROR: Tab not found") {
        return Ok(Vec::new());
    }
    if response.starts_with("ERROR") {
        return Err(Error::Protocol(response.to_string()));
    }

    let mut surfaces = Vec::new();
    for line in non_blank_lines(response) {
        let (focused, rest) = selection(line);
        if let Some((index, id)) = rest.split_once(' ') {
            surfaces.push(Surface {
                index: parse_index(index, line)?,
                id: id.to_string(),
                focused,
            });
        }
    }
    Ok(surfaces)
}

/// Rows look like `<n>:<id>|<tab>|<surface or none>|<read|unread>|<title>|<subtitle>|<body>`.
/// Rows with fewer than seven fields are skipped; the body may contain `|`.
pub(crate) fn parse_notifications(response: &str) -> Result<Vec<Notification>> {
    if response == "No notifications" {
        return Ok(Vec::new());
    }
    if response.starts_with("ERROR") {
        return Err(Error::Protocol(response.to_string()));
    }

    let items = non_blank_lines(response)
        .filter_map(|line| {
            let (_, payload) = line.split_once(':')?;
            let parts: Vec<&str> = payload.splitn(7, '|').collect();
            let [id, tab_id, surface_id, read, title, subtitle, body] = parts[..] else {
                return None;
            };
            Some(Notification {
                id: id.to_string(),
                tab_id: tab_id.to_string(),
                surface_id: (surface_id != "none").then(|| surface_id.to_string()),
                is_read: read == "read",
                title: title.to_string(),
                subtitle: subtitle.to_string(),
                body: body.to_string(),
            })
        })
        .collect();
    Ok(items)
}

pub(crate) fn parse_log(response: &str) -> Result<Vec<LogEntry>> {
    if response.is_empty() || response == "No log entries" {
        return Ok(Vec::new());
    }
    if response.starts_with("ERROR") {
        return Err(Error::Protocol(response.to_string()));
    }
    Ok(non_blank_lines(response).filter_map(parse_log_line).collect())
}

/// Parses `[level] message` with an optional ` (source=S)` suffix.
fn parse_log_line(line: &str) -> Option<LogEntry> {
    let line = line.trim_end_matches('\r');
    let rest = line.trim_start().strip_prefix('[')?;
    let (level, rest) = rest.split_once(']')?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);

    let (message, source) = match rest
        .strip_suffix(')')
        .and_then(|body| body.rsplit_once(" (source="))
    {
        Some((message, source)) => (message, Some(source.to_string())),
        None => (rest, None),
    };

    Some(LogEntry {
        level: level.to_string(),
        message: message.to_string(),
        source,
    })
}

pub(crate) fn parse_count(response: String) -> Result<u64> {
    let payload = expect_ok_payload(response)?;
    payload
        .trim()
        .parse()
        .map_err(|_| Error::Protocol(format!("OK {payload}")))
}
