//! The application shell: one object bound to the window and the embedded
//! editor, relaying events between them and the backend.
//!
//! Transitions are explicit methods invoked by the runtime loop (or directly
//! by an embedder): `on_ready` once the editor element exists,
//! `on_backend_attached` for every backend attach, `on_attached` once the
//! document is laid out. Handlers that the chrome only installs in a
//! later phase are inert until that phase is reached.

use crate::launch::{edit_command, launch_args, runtime_command};
use crate::notification::{SUBSCRIPTIONS, ShellNotification};
use crate::ShellSettings;
use core_events::{DropEvent, Event, KeyCode, KeyEvent, Notification};
use core_host::{BackendClient, BackendFuture, EditorHandle, WindowHost};
use core_plugin::{ComponentLoader, PluginHost};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{Sender, WeakSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellPhase {
    Constructed,
    UiReady,
    BackendAttached,
}

/// Whether the host should still run its default handling for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    PreventDefault,
    Default,
}

pub struct Shell<W: WindowHost, E: EditorHandle, P: PluginHost> {
    window: W,
    editor: Option<E>,
    loader: ComponentLoader<P>,
    client: Option<Arc<dyn BackendClient>>,
    argv: Vec<String>,
    runtime_dir: PathBuf,
    nyaovimrc: Option<PathBuf>,
    phase: ShellPhase,
    attach_count: u32,
    layout_checked: bool,
    events: WeakSender<Event>,
    in_flight: Vec<JoinHandle<()>>,
}

impl<W: WindowHost, E: EditorHandle, P: PluginHost> Shell<W, E, P> {
    /// Launch arguments are computed here, before any UI exists.
    pub fn new(
        window: W,
        loader: ComponentLoader<P>,
        settings: ShellSettings,
        events: &Sender<Event>,
    ) -> Self {
        let argv = launch_args(&settings.forwarded_args, &window.app_version(), &settings.editor);
        debug!(target: "shell", argc = argv.len(), "launch_args_ready");
        Self {
            window,
            editor: None,
            loader,
            client: None,
            argv,
            runtime_dir: settings.runtime_dir,
            nyaovimrc: settings.nyaovimrc,
            phase: ShellPhase::Constructed,
            attach_count: 0,
            layout_checked: false,
            events: events.downgrade(),
            in_flight: Vec::new(),
        }
    }

    /// Bind the editor element. Only the first call has an effect.
    pub fn on_ready(&mut self, editor: E) {
        if self.phase != ShellPhase::Constructed {
            debug!(target: "shell", phase = ?self.phase, "ready_ignored");
            return;
        }
        self.editor = Some(editor);
        self.phase = ShellPhase::UiReady;
        info!(target: "shell", "ui_ready");
        if let Some(rc) = self.nyaovimrc.take() {
            self.loader.register_component(&rc.to_string_lossy());
        }
    }

    /// One-time layout fixup: size the window to the rendered document.
    pub fn on_attached(&mut self) {
        if self.layout_checked {
            return;
        }
        self.layout_checked = true;
        let window_size = self.window.content_size();
        let document_size = self.window.document_size();
        if window_size != document_size {
            debug!(
                target: "shell",
                from_w = window_size.width,
                from_h = window_size.height,
                to_w = document_size.width,
                to_h = document_size.height,
                "fit_window_to_document"
            );
            if let Err(e) = self.window.set_content_size(document_size) {
                warn!(target: "shell", error = %e, "window_resize_failed");
            }
        }
    }

    /// Capability exchange with a freshly attached backend. Runs again on
    /// reconnect; the dispatcher itself is only ever installed once.
    pub fn on_backend_attached(&mut self) {
        let Some(editor) = self.editor.as_ref() else {
            warn!(target: "shell", "backend_attached_before_ready");
            return;
        };
        let client = editor.client();
        self.attach_count += 1;
        info!(target: "shell", attach = self.attach_count, "backend_attached");

        self.request_runtime_paths(&*client);
        let command = runtime_command(&self.runtime_dir);
        self.spawn_call("command", client.command(&command));
        for channel in SUBSCRIPTIONS {
            self.spawn_call("subscribe", client.subscribe(channel));
        }

        self.client = Some(client);
        self.phase = ShellPhase::BackendAttached;
    }

    /// Continuation of the runtime-path request.
    pub fn on_runtime_paths(&mut self, paths: Vec<String>) {
        debug!(target: "shell", count = paths.len(), "runtime_paths_resolved");
        self.loader.scan_search_paths(&paths);
        self.loader.mark_initially_loaded();
    }

    pub fn on_notification(&mut self, notification: &Notification) {
        if self.phase != ShellPhase::BackendAttached {
            trace!(target: "shell.notify", method = notification.method.as_str(), "no_dispatcher");
            return;
        }
        match ShellNotification::parse(notification) {
            ShellNotification::LoadPath(path) => self.loader.register_component(path),
            ShellNotification::LoadPluginDir(dir) => self.loader.scan_plugin_directory(dir),
            ShellNotification::EditStart(file) => self.edit_started(file),
            ShellNotification::Ignored => {
                trace!(target: "shell.notify", method = notification.method.as_str(), "ignored")
            }
        }
    }

    fn edit_started(&mut self, file: &str) {
        debug!(target: "shell.notify", file, "edit_start");
        if let Err(e) = self.window.set_represented_filename(file) {
            warn!(target: "shell", error = %e, "represented_file_failed");
        }
        if let Err(e) = self.window.add_recent_document(file) {
            warn!(target: "shell", error = %e, "recent_document_failed");
        }
    }

    /// Close the window after the editor quit. Returns false while the quit
    /// listener is not bound yet.
    pub fn on_quit(&mut self) -> bool {
        if self.phase == ShellPhase::Constructed {
            debug!(target: "shell", "quit_before_ready");
            return false;
        }
        info!(target: "shell", "editor_quit");
        if let Err(e) = self.window.close() {
            warn!(target: "shell", error = %e, "window_close_failed");
        }
        true
    }

    pub fn on_beep(&mut self) {
        if self.phase != ShellPhase::Constructed {
            self.window.beep();
        }
    }

    pub fn on_title_changed(&mut self) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };
        let title = editor.title();
        if let Err(e) = self.window.set_title(&title) {
            warn!(target: "shell", error = %e, "set_title_failed");
        }
    }

    /// Escape anywhere in the window gives focus back to the editor.
    pub fn on_key_down(&mut self, key: &KeyEvent) {
        if key.code != KeyCode::Esc {
            return;
        }
        if let Some(editor) = self.editor.as_mut()
            && !editor.is_focused()
        {
            trace!(target: "shell", "refocus_editor");
            editor.focus();
        }
    }

    pub fn on_drag_over(&mut self) -> Disposition {
        match self.phase {
            ShellPhase::Constructed => Disposition::Default,
            _ => Disposition::PreventDefault,
        }
    }

    pub fn on_drop(&mut self, event: &DropEvent) -> Disposition {
        if self.phase != ShellPhase::BackendAttached {
            return Disposition::Default;
        }
        if let Some(file) = event.files.first() {
            self.edit(file);
        }
        Disposition::PreventDefault
    }

    /// OS level open-file request.
    pub fn on_open_file(&mut self, path: &Path) -> Disposition {
        if self.phase != ShellPhase::BackendAttached {
            return Disposition::Default;
        }
        self.edit(path);
        Disposition::PreventDefault
    }

    fn edit(&mut self, path: &Path) {
        let Some(client) = self.client.clone() else {
            return;
        };
        self.spawn_call("command", client.command(&edit_command(path)));
    }

    fn request_runtime_paths(&mut self, client: &dyn BackendClient) {
        let request = client.list_runtime_paths();
        let events = self.events.clone();
        self.spawn_tracked("list_runtime_paths", async move {
            match request.await {
                Ok(paths) => {
                    let Some(tx) = events.upgrade() else {
                        return;
                    };
                    if tx.send(Event::RuntimePathsResolved(paths)).await.is_err() {
                        debug!(target: "shell.backend", "runtime_paths_dropped");
                    }
                }
                Err(e) => warn!(target: "shell.backend", error = %e, "runtime_paths_failed"),
            }
        });
    }

    fn spawn_call(&mut self, call: &'static str, request: BackendFuture<()>) {
        self.spawn_tracked(call, async move {
            if let Err(e) = request.await {
                warn!(target: "shell.backend", call, error = %e, "backend_call_failed");
            }
        });
    }

    /// Run the completion of an already issued request on the ambient runtime.
    /// Without one the request still went out; only its completion is lost.
    fn spawn_tracked<F>(&mut self, call: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            warn!(target: "shell.backend", call, "no_async_runtime");
            return;
        };
        self.in_flight.retain(|h| !h.is_finished());
        self.in_flight.push(runtime.spawn(task));
    }

    /// Abort backend calls that never resolved.
    pub fn shutdown(&mut self) {
        let pending = self.in_flight.iter().filter(|h| !h.is_finished()).count();
        for handle in self.in_flight.drain(..) {
            handle.abort();
        }
        debug!(target: "shell", pending, "shell_shutdown");
    }

    pub fn phase(&self) -> ShellPhase {
        self.phase
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn attach_count(&self) -> u32 {
        self.attach_count
    }

    pub fn loader(&self) -> &ComponentLoader<P> {
        &self.loader
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn editor(&self) -> Option<&E> {
        self.editor.as_ref()
    }

    pub fn initially_loaded(&self) -> bool {
        self.loader.initially_loaded()
    }
}
