//! Typed cmux operations.
//!
//! [`Commands`] is implemented for every [`CommandChannel`], so importing the
//! trait is enough to call these on a [`crate::Client`]. Each operation builds
//! one command line, sends it, and classifies the reply: a response starting
//! with `OK` is success, anything else becomes
//! [`Error::Protocol`](crate::Error::Protocol) carrying the server's text.
//! Listings map their "nothing here" replies to empty vectors.

mod format;
mod parse;
mod types;


pub use format::{escape_text, quote_option_value, unquote_option_value, CommandLine};
pub use types::{
    LogEntry, Notification, ParseSplitDirectionError, SplitDirection, Surface, Tab, Target,
};

use crate::client::CommandChannel;
use crate::error::Result;

fn run<C: CommandChannel + ?Sized>(channel: &mut C, line: CommandLine) -> Result<String> {
    channel.execute(line.as_str())
}

fn run_ok<C: CommandChannel + ?Sized>(channel: &mut C, line: CommandLine) -> Result<()> {
    parse::expect_ok(run(channel, line)?).map(|_| ())
}

fn notify_payload(title: &str, subtitle: &str, body: &str) -> String {
    if subtitle.is_empty() && body.is_empty() {
        title.to_string()
    } else {
        format!("{title}|{subtitle}|{body}")
    }
}

/// Typed operations over a [`CommandChannel`].
pub trait Commands: CommandChannel {
    /// Returns `true` if the server answers `PONG`.
    fn ping(&mut self) -> Result<bool> {
        Ok(self.execute("ping")? == "PONG")
    }

    /// The server's help text, verbatim.
    fn help(&mut self) -> Result<String> {
        self.execute("help")
    }

    // Tabs

    /// Lists all tabs in the window.
    fn list_tabs(&mut self) -> Result<Vec<Tab>> {
        parse::parse_tabs(&self.execute("list_tabs")?)
    }

    /// Opens a tab and returns its id.
    fn new_tab(&mut self) -> Result<String> {
        parse::expect_ok_payload(self.execute("new_tab")?)
    }

    /// Closes a tab.
    fn close_tab(&mut self, tab: impl Into<Target>) -> Result<()> {
        run_ok(self, CommandLine::new("close_tab").target(tab))
    }

    /// Selects a tab.
    fn select_tab(&mut self, tab: impl Into<Target>) -> Result<()> {
        run_ok(self, CommandLine::new("select_tab").target(tab))
    }

    /// Id of the selected tab.
    fn current_tab(&mut self) -> Result<String> {
        parse::reject_error(self.execute("current_tab")?)
    }

    // Surfaces

    /// Splits the focused surface.
    fn new_split(&mut self, direction: SplitDirection) -> Result<()> {
        run_ok(self, CommandLine::new("new_split").arg(direction))
    }

    /// Lists surfaces of `tab`, or of the selected tab when `None`.
    ///
    /// An unknown tab yields an empty list.
    fn list_surfaces(&mut self, tab: Option<Target>) -> Result<Vec<Surface>> {
        let mut line = CommandLine::new("list_surfaces");
        if let Some(tab) = tab {
            line = line.target(tab);
        }
        parse::parse_surfaces(&run(self, line)?)
    }

    /// Focuses a surface of the selected tab.
    fn focus_surface(&mut self, surface: impl Into<Target>) -> Result<()> {
        run_ok(self, CommandLine::new("focus_surface").target(surface))
    }

    // Text injection

    /// Types `text` into the focused terminal.
    ///
    /// Newlines in `text` are sent as Enter.
    fn send(&mut self, text: &str) -> Result<()> {
        run_ok(self, CommandLine::new("send").text(text))
    }

    /// Types `text` into a specific surface.
    fn send_surface(&mut self, surface: impl Into<Target>, text: &str) -> Result<()> {
        run_ok(
            self,
            CommandLine::new("send_surface").target(surface).text(text),
        )
    }

    /// Sends a named key such as `enter`, `tab` or `ctrl-z`.
    fn send_key(&mut self, key: &str) -> Result<()> {
        run_ok(self, CommandLine::new("send_key").arg(key))
    }

    /// Sends a named key to a specific surface.
    fn send_key_surface(&mut self, surface: impl Into<Target>, key: &str) -> Result<()> {
        run_ok(
            self,
            CommandLine::new("send_key_surface")
                .target(surface)
                .arg(key),
        )
    }

    /// Types `text` followed by Enter.
    fn send_line(&mut self, text: &str) -> Result<()> {
        self.send(&format!("{text}\n"))
    }

    /// Interrupts the foreground process.
    fn send_ctrl_c(&mut self) -> Result<()> {
        self.send_key("ctrl-c")
    }

    /// Sends end-of-file.
    fn send_ctrl_d(&mut self) -> Result<()> {
        self.send_key("ctrl-d")
    }

    // Notifications

    /// Posts a notification on the focused surface.
    fn notify(&mut self, title: &str, subtitle: &str, body: &str) -> Result<()> {
        let payload = notify_payload(title, subtitle, body);
        run_ok(self, CommandLine::new("notify").text(&payload))
    }

    /// Posts a notification on a specific surface.
    fn notify_surface(
        &mut self,
        surface: impl Into<Target>,
        title: &str,
        subtitle: &str,
        body: &str,
    ) -> Result<()> {
        let payload = notify_payload(title, subtitle, body);
        run_ok(
            self,
            CommandLine::new("notify_surface")
                .target(surface)
                .text(&payload),
        )
    }

    /// Lists pending and read notifications.
    fn list_notifications(&mut self) -> Result<Vec<Notification>> {
        parse::parse_notifications(&self.execute("list_notifications")?)
    }

    /// Removes all notifications.
    fn clear_notifications(&mut self) -> Result<()> {
        run_ok(self, CommandLine::new("clear_notifications"))
    }

    /// Focuses a tab, and optionally a surface, the way clicking a
    /// notification does.
    fn focus_notification(
        &mut self,
        tab: impl Into<Target>,
        surface: Option<Target>,
    ) -> Result<()> {
        let mut line = CommandLine::new("focus_notification").target(tab);
        if let Some(surface) = surface {
            line = line.target(surface);
        }
        run_ok(self, line)
    }

    // App focus

    /// Overrides whether the app counts as focused; `None` clears the override.
    fn set_app_focus(&mut self, active: Option<bool>) -> Result<()> {
        let value = match active {
            Some(true) => "active",
            Some(false) => "inactive",
            None => "clear",
        };
        run_ok(self, CommandLine::new("set_app_focus").arg(value))
    }

    /// Triggers the app-became-active handling.
    fn simulate_app_active(&mut self) -> Result<()> {
        run_ok(self, CommandLine::new("simulate_app_active"))
    }

    // Sidebar metadata

    /// Sets a keyed status pill.
    fn set_status(
        &mut self,
        key: &str,
        value: &str,
        icon: Option<&str>,
        color: Option<&str>,
        tab: Option<&str>,
    ) -> Result<()> {
        let line = CommandLine::new("set_status")
            .value(key)
            .value(value)
            .option("icon", icon)
            .option("color", color)
            .option("tab", tab);
        run_ok(self, line)
    }

    /// Removes a status pill.
    fn clear_status(&mut self, key: &str, tab: Option<&str>) -> Result<()> {
        let line = CommandLine::new("clear_status")
            .value(key)
            .option("tab", tab);
        run_ok(self, line)
    }

    /// Appends a sidebar log entry.
    ///
    /// `message` goes after a `--` separator, so it may contain tokens that
    /// look like options.
    fn log(
        &mut self,
        message: &str,
        level: Option<&str>,
        source: Option<&str>,
        tab: Option<&str>,
    ) -> Result<()> {
        let line = CommandLine::new("log")
            .option("level", level)
            .option("source", source)
            .option("tab", tab)
            .trailing_text(message);
        run_ok(self, line)
    }

    /// Reads sidebar log entries, oldest first.
    fn list_log(&mut self, limit: Option<usize>, tab: Option<&str>) -> Result<Vec<LogEntry>> {
        let limit = limit.map(|n| n.to_string());
        let line = CommandLine::new("list_log")
            .option("tab", tab)
            .option("limit", limit.as_deref());
        parse::parse_log(&run(self, line)?)
    }

    /// Empties the sidebar log.
    fn clear_log(&mut self, tab: Option<&str>) -> Result<()> {
        run_ok(self, CommandLine::new("clear_log").option("tab", tab))
    }

    /// Shows a progress bar; `value` is between 0.0 and 1.0.
    fn set_progress(&mut self, value: f64, label: Option<&str>, tab: Option<&str>) -> Result<()> {
        let line = CommandLine::new("set_progress")
            .arg(format_args!("{value:?}"))
            .quoted_option("label", label)
            .option("tab", tab);
        run_ok(self, line)
    }

    /// Hides the progress bar.
    fn clear_progress(&mut self, tab: Option<&str>) -> Result<()> {
        run_ok(self, CommandLine::new("clear_progress").option("tab", tab))
    }

    /// Reports the checked-out git branch.
    fn report_git_branch(
        &mut self,
        branch: &str,
        status: Option<&str>,
        tab: Option<&str>,
    ) -> Result<()> {
        let line = CommandLine::new("report_git_branch")
            .value(branch)
            .option("status", status)
            .option("tab", tab);
        run_ok(self, line)
    }

    /// Reports listening ports.
    fn report_ports(&mut self, ports: &[u16], tab: Option<&str>) -> Result<()> {
        let mut line = CommandLine::new("report_ports");
        for port in ports {
            line = line.arg(port);
        }
        run_ok(self, line.option("tab", tab))
    }

    /// Removes reported ports.
    fn clear_ports(&mut self, tab: Option<&str>) -> Result<()> {
        run_ok(self, CommandLine::new("clear_ports").option("tab", tab))
    }

    /// Dumps all sidebar metadata, verbatim.
    fn sidebar_state(&mut self, tab: Option<&str>) -> Result<String> {
        run(self, CommandLine::new("sidebar_state").option("tab", tab))
    }

    /// Clears all sidebar metadata.
    fn reset_sidebar(&mut self, tab: Option<&str>) -> Result<()> {
        run_ok(self, CommandLine::new("reset_sidebar").option("tab", tab))
    }

    // Diagnostics

    /// How many times a surface has flashed.
    fn flash_count(&mut self, surface: impl Into<Target>) -> Result<u64> {
        let line = CommandLine::new("flash_count").target(surface);
        parse::parse_count(run(self, line)?)
    }

    /// Zeroes all flash counters.
    fn reset_flash_counts(&mut self) -> Result<()> {
        run_ok(self, CommandLine::new("reset_flash_counts"))
    }
}

impl<C: CommandChannel + ?Sized> Commands for C {}

/// Sends `line` verbatim and requires an `OK` reply.
///
/// For commands the typed surface does not cover.
pub fn execute_ok<C: CommandChannel + ?Sized>(channel: &mut C, line: &str) -> Result<String> {
    parse::expect_ok(channel.execute(line)?)
}
