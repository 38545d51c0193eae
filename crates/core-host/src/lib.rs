//! Contracts of the collaborators the shell is wired between.
//!
//! The window host, the embedded editor element and the backend RPC client are
//! supplied from outside; this crate only names what the shell needs from them.

use anyhow::Result;
use std::sync::Arc;

pub mod backend;
pub use backend::{BackendClient, BackendError, BackendFuture};

/// Content or document size in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Window and application chrome owned by the windowing host.
pub trait WindowHost {
    fn close(&mut self) -> Result<()>;
    /// Current inner (content) size of the window.
    fn content_size(&self) -> Size;
    fn set_content_size(&mut self, size: Size) -> Result<()>;
    /// Rendered size of the shell document (scroll width/height).
    fn document_size(&self) -> Size;
    fn set_title(&mut self, title: &str) -> Result<()>;
    /// Proxy icon / represented file of the window.
    fn set_represented_filename(&mut self, path: &str) -> Result<()>;
    fn add_recent_document(&mut self, path: &str) -> Result<()>;
    /// Audible alert.
    fn beep(&mut self);
    fn app_version(&self) -> String;
}

/// The embedded editor element. The element owns the editor instance; the shell
/// only holds this handle.
pub trait EditorHandle {
    fn is_focused(&self) -> bool;
    fn focus(&mut self);
    fn title(&self) -> String;
    /// RPC client of the attached backend process.
    fn client(&self) -> Arc<dyn BackendClient>;
}

impl<T: WindowHost + ?Sized> WindowHost for &mut T {
    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
    fn content_size(&self) -> Size {
        (**self).content_size()
    }
    fn set_content_size(&mut self, size: Size) -> Result<()> {
        (**self).set_content_size(size)
    }
    fn document_size(&self) -> Size {
        (**self).document_size()
    }
    fn set_title(&mut self, title: &str) -> Result<()> {
        (**self).set_title(title)
    }
    fn set_represented_filename(&mut self, path: &str) -> Result<()> {
        (**self).set_represented_filename(path)
    }
    fn add_recent_document(&mut self, path: &str) -> Result<()> {
        (**self).add_recent_document(path)
    }
    fn beep(&mut self) {
        (**self).beep()
    }
    fn app_version(&self) -> String {
        (**self).app_version()
    }
}
