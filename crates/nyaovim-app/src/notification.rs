//! Backend notification channels the shell subscribes to.

use core_events::Notification;

pub const LOAD_PATH: &str = "nyaovim:load-path";
pub const LOAD_PLUGIN_DIR: &str = "nyaovim:load-plugin-dir";
pub const EDIT_START: &str = "nyaovim:edit-start";

/// Subscription order used on every backend attach.
pub const SUBSCRIPTIONS: [&str; 3] = [LOAD_PATH, LOAD_PLUGIN_DIR, EDIT_START];

/// A notification the shell acts on, borrowed from the raw message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellNotification<'a> {
    LoadPath(&'a str),
    LoadPluginDir(&'a str),
    EditStart(&'a str),
    /// Unknown method, or a known one without a string first argument.
    Ignored,
}

impl<'a> ShellNotification<'a> {
    pub fn parse(notification: &'a Notification) -> Self {
        let arg = notification.first_str_arg();
        match (notification.method.as_str(), arg) {
            (LOAD_PATH, Some(path)) => Self::LoadPath(path),
            (LOAD_PLUGIN_DIR, Some(dir)) => Self::LoadPluginDir(dir),
            (EDIT_START, Some(file)) => Self::EditStart(file),
            _ => Self::Ignored,
        }
    }
}
