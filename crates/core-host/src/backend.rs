//! Backend (editor process) RPC client contract.
//!
//! Calling a method issues the request right away; the returned future only
//! waits for the response. Callers rely on this to keep issue order equal to
//! call order while still spawning the futures independently.

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed response future returned by every backend call.
pub type BackendFuture<T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'static>>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend connection closed")]
    Disconnected,
    #[error("rpc `{method}` failed: {message}")]
    Rpc { method: String, message: String },
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

pub trait BackendClient: Send + Sync {
    /// Ask the backend for its configured runtime search path.
    fn list_runtime_paths(&self) -> BackendFuture<Vec<String>>;
    /// Subscribe to a notification channel (`nyaovim:load-path`, ...).
    fn subscribe(&self, event: &str) -> BackendFuture<()>;
    /// Execute an Ex command.
    fn command(&self, command: &str) -> BackendFuture<()>;
}

impl<T: BackendClient + ?Sized> BackendClient for std::sync::Arc<T> {
    fn list_runtime_paths(&self) -> BackendFuture<Vec<String>> {
        (**self).list_runtime_paths()
    }
    fn subscribe(&self, event: &str) -> BackendFuture<()> {
        (**self).subscribe(event)
    }
    fn command(&self, command: &str) -> BackendFuture<()> {
        (**self).command(command)
    }
}
