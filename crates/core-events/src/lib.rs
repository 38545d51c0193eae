//! Core event types and channel helpers for the NyaoVim shell.
//!
//! Every stimulus the shell reacts to (window chrome, the embedded editor
//! element, backend notifications, and continuations of backend requests)
//! is normalized into one `Event` and delivered over a single bounded channel
//! to the runtime loop. The loop runs on one task, so handlers never race.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// Producers (host glue, backend notification pumps, spawned backend continuations) share one
// bounded mpsc channel sized by `EVENT_CHANNEL_CAP`. Producers await `send`, so a slow shell applies
// backpressure instead of dropping notifications.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 1024;

pub static NOTIFICATIONS_FORWARDED: AtomicU64 = AtomicU64::new(0);
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);

/// Top-level event enum consumed by the shell runtime loop.
#[derive(Debug, Clone)]
pub enum Event {
    Editor(EditorEvent),
    Host(HostEvent),
    /// Out-of-band message pushed by the backend.
    Notification(Notification),
    /// Continuation of the runtime-path request issued on backend attach.
    RuntimePathsResolved(Vec<String>),
    Shutdown,
}

/// Lifecycle and store events emitted by the embedded editor element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The editor element became available.
    Ready,
    Quit,
    Beep,
    TitleChanged,
    /// The backend process attached (may repeat on reconnect).
    ProcessAttached,
}

/// Events delivered by the windowing host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    CloseRequested,
    KeyDown(KeyEvent),
    DragOver,
    Drop(DropEvent),
    /// OS level "open file" request (dock icon, file association).
    OpenFile(PathBuf),
    /// The shell's document was attached and laid out.
    DomAttached,
}

/// Payload of a drop onto the editor element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropEvent {
    pub files: Vec<PathBuf>,
}

impl DropEvent {
    pub fn with_files(files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }
}

/// Backend notification: a method name plus a variable-length argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub method: String,
    pub args: Vec<serde_json::Value>,
}

impl Notification {
    pub fn new(method: impl Into<String>, args: Vec<serde_json::Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// First argument when it is a string (the only shape the shell consumes).
    pub fn first_str_arg(&self) -> Option<&str> {
        self.args.first().and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }
}

/// Logical keys the host reports for global key-down events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    F(u8),
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
        const META = 0b0000_1000;
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.code, self.mods)
    }
}

// -------------------------------------------------------------------------------------------------
// Async Event Sources
// -------------------------------------------------------------------------------------------------
// Integrations that produce events on their own schedule (backend notification streams, host
// event bridges) implement `AsyncEventSource`. Each source owns its task; on channel send failure
// (runtime dropped its receiver) it must terminate promptly.

/// Trait implemented by any async event producer. Implementors usually hold a receiver or
/// configuration and spawn one background task that pushes `Event`s into the shared channel.
pub trait AsyncEventSource: Send + 'static {
    /// Human-readable stable identifier (used for logging / diagnostics).
    fn name(&self) -> &'static str;
    /// Consume self and spawn the background task, returning a JoinHandle. Implementors should
    /// stop when `tx.send(..).await` returns Err (channel closed) or on their own stop condition.
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Registry of event sources spawned together at startup.
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl Default for EventSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Spawn all registered sources, returning their JoinHandles. Each source receives its own
    /// clone of `tx`; the registry keeps no sender once this returns, so dropping the caller's
    /// sender lets sources observe the closed channel during shutdown.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        // Take ownership so duplicate spawns are prevented if called twice.
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning event source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}

/// Bridges a backend notification stream into the runtime channel.
///
/// Backend client implementations hand the receiving half of their notification channel to a
/// pump; the pump forwards each message as `Event::Notification` and stops when either the
/// backend side or the runtime side closes.
pub struct NotificationPump {
    rx: Receiver<Notification>,
}

impl NotificationPump {
    pub fn new(rx: Receiver<Notification>) -> Self {
        Self { rx }
    }
}

impl AsyncEventSource for NotificationPump {
    fn name(&self) -> &'static str {
        "backend_notifications"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let mut rx = self.rx;
        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                if tx.send(Event::Notification(notification)).await.is_err() {
                    CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                    break;
                }
                NOTIFICATIONS_FORWARDED.fetch_add(1, Ordering::Relaxed);
            }
            tracing::debug!(target: "runtime.events", "notification pump stopped");
        })
    }
}

/// Create the runtime channel with the standard capacity.
pub fn event_channel() -> (Sender<Event>, Receiver<Event>) {
    tokio::sync::mpsc::channel(EVENT_CHANNEL_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_event_display() {
        let k = KeyEvent::new(KeyCode::Esc, KeyModifiers::CTRL);
        let s = format!("{}", k);
        assert!(s.contains("Esc"));
    }

    #[test]
    fn first_str_arg_requires_string() {
        let n = Notification::new("nyaovim:load-path", vec![json!("/x/y.html"), json!(1)]);
        assert_eq!(n.first_str_arg(), Some("/x/y.html"));

        let n = Notification::new("nyaovim:load-path", vec![json!(42)]);
        assert_eq!(n.first_str_arg(), None);

        let n = Notification::new("nyaovim:load-path", Vec::new());
        assert_eq!(n.first_str_arg(), None);
    }

    #[test]
    fn drop_event_keeps_order() {
        let ev = DropEvent::with_files([PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(ev.files[0], PathBuf::from("/a"));
        assert_eq!(ev.files.len(), 2);
    }
}
