//! NyaoVim front-end shell.
//!
//! Glue between a windowing host, an embedded editor element and the editor
//! backend: plugin components found on the backend's runtime path are loaded
//! through `core_plugin`, and window chrome (title, represented file, recent
//! documents, drag and drop) follows what the backend reports.
//!
//! Host integrations go through `app::AppStartup`, which loads the config,
//! installs logging and returns the event sender to feed host and editor
//! events into. A `Shell` can also be driven directly through its `on_*`
//! methods or wrapped in a `ShellRuntime` by hand.

use core_config::{Config, EditorConfig};
use std::path::PathBuf;

pub mod app;
pub mod launch;
pub mod notification;
pub mod runtime;
pub mod shell;
pub mod startup;

pub use app::{App, AppStartup, HostParts};
pub use runtime::{ShellRuntime, ShutdownReason};
pub use shell::{Disposition, Shell, ShellPhase};

/// Inputs the shell needs at construction.
#[derive(Debug, Clone)]
pub struct ShellSettings {
    /// Raw process argv, host slots included.
    pub forwarded_args: Vec<String>,
    pub editor: EditorConfig,
    /// Directory appended to the backend's runtimepath on attach.
    pub runtime_dir: PathBuf,
    /// User fragment registered on UI-ready.
    pub nyaovimrc: Option<PathBuf>,
}

impl ShellSettings {
    pub fn from_config(config: &Config, forwarded_args: Vec<String>) -> Self {
        let runtime_dir = config
            .file
            .runtime
            .dir
            .clone()
            .unwrap_or_else(launch::bundled_runtime_dir);
        Self {
            forwarded_args,
            editor: config.file.editor.clone(),
            runtime_dir,
            nyaovimrc: config.nyaovimrc().map(PathBuf::from),
        }
    }
}
