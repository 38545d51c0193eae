//! Composition root for host integrations.
//!
//! `AppStartup::run` prepares the process (file logging, panic hook, config).
//! `AppStartup::launch` then wires one window, editor element and plugin host
//! into a running shell: the backend notification stream is bridged into the
//! event channel by a `NotificationPump`, and the returned sender is what the
//! host glue feeds window and editor events into.

use crate::ShellSettings;
use crate::runtime::{ShellRuntime, ShutdownReason};
use crate::shell::Shell;
use crate::startup::{configure_logging, install_panic_hook};
use anyhow::{Context, Result};
use core_config::Config;
use core_events::{
    CHANNEL_SEND_FAILURES, Event, EventSourceRegistry, NOTIFICATIONS_FORWARDED, Notification,
    NotificationPump, event_channel,
};
use core_host::{EditorHandle, WindowHost};
use core_plugin::{ComponentLoader, PluginHost};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// Host-side pieces handed over at launch.
pub struct HostParts<W, E, P> {
    pub window: W,
    /// Bound to the shell on the first `EditorEvent::Ready`.
    pub element: E,
    pub plugin_host: P,
    /// Receiving half of the backend's notification stream.
    pub notifications: Receiver<Notification>,
}

pub struct AppStartup {
    config: Config,
    /// Flushes the log file on drop; keep the startup alive for the process.
    _log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    /// Log to `<log_dir>/nyaovim.log`, install the panic hook and load the
    /// config. `config_path` replaces config discovery.
    pub fn run(log_dir: &Path, config_path: Option<PathBuf>) -> Result<Self> {
        let log_guard = configure_logging(log_dir)?;
        install_panic_hook();
        info!(target: "runtime", "startup");

        let config = core_config::load_from(config_path)?;
        info!(
            target: "runtime.startup",
            config_file = config.raw.is_some(),
            nyaovimrc = config.nyaovimrc().is_some(),
            "bootstrap_complete"
        );
        Ok(Self {
            config,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the shell and spawn its event sources. Fails outside a Tokio
    /// runtime.
    pub fn launch<W, E, P>(
        &self,
        parts: HostParts<W, E, P>,
        forwarded_args: Vec<String>,
    ) -> Result<(Sender<Event>, App<W, E, P>)>
    where
        W: WindowHost,
        E: EditorHandle,
        P: PluginHost,
    {
        Handle::try_current().context("shell launch requires a tokio runtime")?;

        let settings = ShellSettings::from_config(&self.config, forwarded_args);
        let (tx, rx) = event_channel();
        let mut registry = EventSourceRegistry::new();
        registry.register(NotificationPump::new(parts.notifications));
        let sources = registry.spawn_all(&tx);

        let loader = ComponentLoader::new(parts.plugin_host);
        let shell = Shell::new(parts.window, loader, settings, &tx);
        let runtime = ShellRuntime::new(shell, parts.element, rx);
        Ok((tx, App { runtime, sources }))
    }
}

/// A launched shell together with the event sources feeding it.
pub struct App<W: WindowHost, E: EditorHandle, P: PluginHost> {
    runtime: ShellRuntime<W, E, P>,
    sources: Vec<JoinHandle<()>>,
}

impl<W: WindowHost, E: EditorHandle, P: PluginHost> App<W, E, P> {
    /// Run the shell loop, then stop the event sources.
    pub async fn run(&mut self) -> Result<ShutdownReason> {
        let reason = self.runtime.run().await?;
        for source in self.sources.drain(..) {
            source.abort();
        }
        info!(
            target: "runtime.events",
            forwarded = NOTIFICATIONS_FORWARDED.load(Ordering::Relaxed),
            send_failures = CHANNEL_SEND_FAILURES.load(Ordering::Relaxed),
            "event_sources_stopped"
        );
        Ok(reason)
    }

    pub fn shell(&self) -> &Shell<W, E, P> {
        self.runtime.shell()
    }
}
