#![allow(dead_code)] // Shared across several integration tests; each test binary uses a subset of helpers.

use core_events::{Event, event_channel};
use core_host::{BackendClient, BackendError, BackendFuture, EditorHandle, Size, WindowHost};
use core_plugin::{ComponentLoader, PluginHost};
use nyaovim_app::{Shell, ShellSettings};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEffect {
    Close,
    Resize(Size),
    Title(String),
    RepresentedFile(String),
    RecentDocument(String),
    Beep,
}

pub struct FakeWindow {
    pub effects: Vec<WindowEffect>,
    pub content: Size,
    pub document: Size,
}

impl Default for FakeWindow {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            content: Size::new(800, 600),
            document: Size::new(800, 600),
        }
    }
}

impl FakeWindow {
    pub fn count(&self, pred: impl Fn(&WindowEffect) -> bool) -> usize {
        self.effects.iter().filter(|e| pred(e)).count()
    }
}

impl WindowHost for FakeWindow {
    fn close(&mut self) -> anyhow::Result<()> {
        self.effects.push(WindowEffect::Close);
        Ok(())
    }
    fn content_size(&self) -> Size {
        self.content
    }
    fn set_content_size(&mut self, size: Size) -> anyhow::Result<()> {
        self.content = size;
        self.effects.push(WindowEffect::Resize(size));
        Ok(())
    }
    fn document_size(&self) -> Size {
        self.document
    }
    fn set_title(&mut self, title: &str) -> anyhow::Result<()> {
        self.effects.push(WindowEffect::Title(title.to_string()));
        Ok(())
    }
    fn set_represented_filename(&mut self, path: &str) -> anyhow::Result<()> {
        self.effects.push(WindowEffect::RepresentedFile(path.to_string()));
        Ok(())
    }
    fn add_recent_document(&mut self, path: &str) -> anyhow::Result<()> {
        self.effects.push(WindowEffect::RecentDocument(path.to_string()));
        Ok(())
    }
    fn beep(&mut self) {
        self.effects.push(WindowEffect::Beep);
    }
    fn app_version(&self) -> String {
        "0.1.0".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    ListRuntimePaths,
    Subscribe(String),
    Command(String),
}

/// Records every issued call. `runtime_paths == None` models a backend that
/// never answers the runtime-path request.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<BackendCall>>,
    pub runtime_paths: Option<Vec<String>>,
}

impl FakeBackend {
    pub fn answering(paths: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            runtime_paths: Some(paths.iter().map(|p| p.to_string()).collect()),
        })
    }

    pub fn hung() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BackendCall::Command(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }
}

impl BackendClient for FakeBackend {
    fn list_runtime_paths(&self) -> BackendFuture<Vec<String>> {
        self.calls.lock().unwrap().push(BackendCall::ListRuntimePaths);
        let paths = self.runtime_paths.clone();
        Box::pin(async move {
            match paths {
                Some(paths) => Ok(paths),
                None => std::future::pending::<Result<Vec<String>, BackendError>>().await,
            }
        })
    }
    fn subscribe(&self, event: &str) -> BackendFuture<()> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Subscribe(event.to_string()));
        Box::pin(async { Ok(()) })
    }
    fn command(&self, command: &str) -> BackendFuture<()> {
        self.calls
            .lock()
            .unwrap()
            .push(BackendCall::Command(command.to_string()));
        Box::pin(async { Ok(()) })
    }
}

pub struct FakeEditor {
    pub focused: bool,
    pub focus_calls: usize,
    pub title: String,
    pub backend: Arc<FakeBackend>,
}

impl FakeEditor {
    pub fn new(backend: Arc<FakeBackend>) -> Self {
        Self {
            focused: true,
            focus_calls: 0,
            title: "[No Name] - NVIM".to_string(),
            backend,
        }
    }
}

impl EditorHandle for FakeEditor {
    fn is_focused(&self) -> bool {
        self.focused
    }
    fn focus(&mut self) {
        self.focused = true;
        self.focus_calls += 1;
    }
    fn title(&self) -> String {
        self.title.clone()
    }
    fn client(&self) -> Arc<dyn BackendClient> {
        self.backend.clone()
    }
}

#[derive(Default)]
pub struct RecordingPluginHost {
    pub imports: Vec<String>,
    pub scripts: Vec<PathBuf>,
}

impl PluginHost for RecordingPluginHost {
    fn name(&self) -> &'static str {
        "recording"
    }
    fn import_component(&mut self, path: &str) {
        self.imports.push(path.to_string());
    }
    fn run_script(&mut self, path: &Path) -> anyhow::Result<()> {
        self.scripts.push(path.to_path_buf());
        Ok(())
    }
}

pub type TestShell = Shell<FakeWindow, FakeEditor, RecordingPluginHost>;

pub fn settings() -> ShellSettings {
    ShellSettings {
        forwarded_args: vec!["nyaovim".into(), "app".into(), "notes.md".into()],
        editor: Default::default(),
        runtime_dir: PathBuf::from("/opt/nyaovim/runtime"),
        nyaovimrc: None,
    }
}

pub fn new_shell(window: FakeWindow, settings: ShellSettings) -> (TestShell, Sender<Event>, Receiver<Event>) {
    let (tx, rx) = event_channel();
    let shell = Shell::new(
        window,
        ComponentLoader::new(RecordingPluginHost::default()),
        settings,
        &tx,
    );
    (shell, tx, rx)
}

/// Shell that went through UI-ready and backend attach against `backend`.
pub fn attached_shell(backend: Arc<FakeBackend>) -> (TestShell, Sender<Event>, Receiver<Event>) {
    let (mut shell, tx, rx) = new_shell(FakeWindow::default(), settings());
    shell.on_ready(FakeEditor::new(backend));
    shell.on_backend_attached();
    (shell, tx, rx)
}
