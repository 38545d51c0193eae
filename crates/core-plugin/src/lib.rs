//! Plugin discovery and registration.
//!
//! Plugins are files in a `nyaovim-plugin` directory below any runtime search
//! path entry. Two kinds are recognized:
//! - visual fragments (`*.html`), registered with the host's component import
//!   mechanism so the definitions they contain become available to the document;
//! - scripts (`*.js`), executed once by the host.
//!
//! Everything else in the directory is ignored. Search-path entries without a
//! plugin directory are the common case and are skipped silently.
//!
//! `PluginHost` is the seam to whatever performs the import and execution;
//! `ComponentLoader` owns the bookkeeping and the directory walk.

use std::path::Path;

pub mod loader;
pub use loader::{COMPONENT_EXTENSION, ComponentLoader, PLUGIN_SUBDIR, SCRIPT_EXTENSION};

/// Host side of plugin loading: imports visual fragments into the active
/// document and executes script plugins.
pub trait PluginHost {
    /// Stable human-readable host identifier (for logs / diagnostics).
    fn name(&self) -> &'static str;
    /// Reference the fragment at `path` from the active document. Errors inside
    /// the fragment are reported by the host's import mechanism, not here.
    fn import_component(&mut self, path: &str);
    /// Load and execute a script plugin. Side effects are the script's own.
    fn run_script(&mut self, path: &Path) -> anyhow::Result<()>;
}

impl<T: PluginHost + ?Sized> PluginHost for &mut T {
    fn name(&self) -> &'static str {
        (**self).name()
    }
    fn import_component(&mut self, path: &str) {
        (**self).import_component(path)
    }
    fn run_script(&mut self, path: &Path) -> anyhow::Result<()> {
        (**self).run_script(path)
    }
}

/// Host that accepts everything and does nothing; bookkeeping still happens in
/// the loader. Used for headless runs.
#[derive(Debug, Default)]
pub struct NoopPluginHost;

impl NoopPluginHost {
    pub fn new() -> Self {
        Self
    }
}

impl PluginHost for NoopPluginHost {
    fn name(&self) -> &'static str {
        "noop-plugin-host"
    }
    fn import_component(&mut self, _path: &str) {}
    fn run_script(&mut self, _path: &Path) -> anyhow::Result<()> {
        Ok(())
    }
}
