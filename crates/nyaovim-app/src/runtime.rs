//! Single-task event loop driving a `Shell`.
//!
//! Every event, including continuations of backend requests, is handled on
//! the task running `ShellRuntime::run`, so shell state is never shared.

use crate::shell::Shell;
use core_events::{EditorEvent, Event, HostEvent};
use core_host::{EditorHandle, WindowHost};
use core_plugin::PluginHost;
use std::fmt;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    EditorQuit,
    WindowClosed,
    ShutdownEvent,
    ChannelClosed,
}

impl ShutdownReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::EditorQuit => "editor_quit",
            ShutdownReason::WindowClosed => "window_closed",
            ShutdownReason::ShutdownEvent => "shutdown_event",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum LoopControl {
    Continue,
    Break { reason: ShutdownReason },
}

pub struct ShellRuntime<W: WindowHost, E: EditorHandle, P: PluginHost> {
    shell: Shell<W, E, P>,
    /// Editor element handed to the shell on the first `Ready`.
    element: Option<E>,
    rx: Receiver<Event>,
}

impl<W: WindowHost, E: EditorHandle, P: PluginHost> ShellRuntime<W, E, P> {
    pub fn new(shell: Shell<W, E, P>, element: E, rx: Receiver<Event>) -> Self {
        Self {
            shell,
            element: Some(element),
            rx,
        }
    }

    /// Handle events until the shell quits, the window closes, a `Shutdown`
    /// arrives or every sender is gone.
    pub async fn run(&mut self) -> anyhow::Result<ShutdownReason> {
        info!(target: "runtime", "event_loop_start");
        let reason = loop {
            if let Some(reason) = self.process_next().await {
                break reason;
            }
        };

        self.rx.close();
        self.shell.shutdown();
        info!(target: "runtime", reason = reason.as_str(), "event_loop_stopped");
        Ok(reason)
    }

    /// Wait for one event and handle it. Returns the stop reason when the
    /// loop should end.
    pub async fn process_next(&mut self) -> Option<ShutdownReason> {
        let Some(event) = self.rx.recv().await else {
            return Some(ShutdownReason::ChannelClosed);
        };
        match self.handle(event) {
            LoopControl::Continue => None,
            LoopControl::Break { reason } => Some(reason),
        }
    }

    fn handle(&mut self, event: Event) -> LoopControl {
        match event {
            Event::Editor(editor_event) => self.handle_editor_event(editor_event),
            Event::Host(host_event) => self.handle_host_event(host_event),
            Event::Notification(notification) => {
                self.shell.on_notification(&notification);
                LoopControl::Continue
            }
            Event::RuntimePathsResolved(paths) => {
                self.shell.on_runtime_paths(paths);
                LoopControl::Continue
            }
            Event::Shutdown => LoopControl::Break {
                reason: ShutdownReason::ShutdownEvent,
            },
        }
    }

    fn handle_editor_event(&mut self, event: EditorEvent) -> LoopControl {
        match event {
            EditorEvent::Ready => match self.element.take() {
                Some(element) => self.shell.on_ready(element),
                None => debug!(target: "runtime", "duplicate_ready"),
            },
            EditorEvent::Quit => {
                if self.shell.on_quit() {
                    return LoopControl::Break {
                        reason: ShutdownReason::EditorQuit,
                    };
                }
            }
            EditorEvent::Beep => self.shell.on_beep(),
            EditorEvent::TitleChanged => self.shell.on_title_changed(),
            EditorEvent::ProcessAttached => self.shell.on_backend_attached(),
        }
        LoopControl::Continue
    }

    fn handle_host_event(&mut self, event: HostEvent) -> LoopControl {
        match event {
            HostEvent::CloseRequested => {
                return LoopControl::Break {
                    reason: ShutdownReason::WindowClosed,
                };
            }
            HostEvent::KeyDown(key) => self.shell.on_key_down(&key),
            HostEvent::DragOver => {
                let disposition = self.shell.on_drag_over();
                trace!(target: "runtime", ?disposition, "drag_over");
            }
            HostEvent::Drop(dropped) => {
                let disposition = self.shell.on_drop(&dropped);
                trace!(target: "runtime", ?disposition, files = dropped.files.len(), "drop");
            }
            HostEvent::OpenFile(path) => {
                let disposition = self.shell.on_open_file(&path);
                trace!(target: "runtime", ?disposition, "open_file");
            }
            HostEvent::DomAttached => self.shell.on_attached(),
        }
        LoopControl::Continue
    }

    pub fn shell(&self) -> &Shell<W, E, P> {
        &self.shell
    }

    pub fn into_shell(self) -> Shell<W, E, P> {
        self.shell
    }
}
