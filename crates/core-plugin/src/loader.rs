use crate::PluginHost;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Conventional plugin directory name below each search-path entry.
pub const PLUGIN_SUBDIR: &str = "nyaovim-plugin";
pub const COMPONENT_EXTENSION: &str = "html";
pub const SCRIPT_EXTENSION: &str = "js";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PluginFileKind {
    Component,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanOutcome {
    Loaded,
    Absent,
}

impl PluginFileKind {
    fn classify(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        if ext == COMPONENT_EXTENSION {
            Some(Self::Component)
        } else if ext == SCRIPT_EXTENSION {
            Some(Self::Script)
        } else {
            None
        }
    }
}

/// Registers visual components and script plugins found on the runtime search path.
///
/// One loader lives for the whole process and is handed to the shell; nothing
/// is ever removed. `component_paths` keeps every registration in insertion
/// order without deduplication, and scanning the same directory twice scans it
/// twice.
pub struct ComponentLoader<P: PluginHost> {
    host: P,
    initially_loaded: bool,
    component_paths: Vec<String>,
    plugin_dirs: Vec<String>,
}

impl<P: PluginHost> ComponentLoader<P> {
    pub fn new(host: P) -> Self {
        Self {
            host,
            initially_loaded: false,
            component_paths: Vec::new(),
            plugin_dirs: Vec::new(),
        }
    }

    /// Import the fragment at `path` and record it.
    pub fn register_component(&mut self, path: &str) {
        debug!(target: "plugin.loader", host = self.host.name(), path, "register_component");
        self.host.import_component(path);
        self.component_paths.push(path.to_string());
    }

    /// Load every plugin in `<dir>/nyaovim-plugin` and record `dir`.
    ///
    /// Entries are visited in file-name order. A missing or unreadable plugin
    /// directory leaves the loader untouched. A script that fails is logged and
    /// the walk continues.
    pub fn scan_plugin_directory(&mut self, dir: &str) {
        if self.load_plugin_subdir(dir) == ScanOutcome::Loaded {
            self.plugin_dirs.push(dir.to_string());
        }
    }

    /// Scan each search-path entry in the given order.
    ///
    /// Every entry counts as scanned and is recorded once, whether or not it
    /// carries a plugin directory.
    pub fn scan_search_paths<S: AsRef<str>>(&mut self, dirs: &[S]) {
        for dir in dirs {
            let dir = dir.as_ref();
            self.load_plugin_subdir(dir);
            self.plugin_dirs.push(dir.to_string());
        }
    }

    fn load_plugin_subdir(&mut self, dir: &str) -> ScanOutcome {
        let plugin_dir = Path::new(dir).join(PLUGIN_SUBDIR);
        let Some(entries) = list_plugin_entries(&plugin_dir) else {
            return ScanOutcome::Absent;
        };

        let mut components = 0usize;
        let mut scripts = 0usize;
        for (file_name, path) in entries {
            match PluginFileKind::classify(&file_name) {
                Some(PluginFileKind::Component) => {
                    self.register_component(&path.to_string_lossy());
                    components += 1;
                }
                Some(PluginFileKind::Script) => {
                    scripts += 1;
                    if let Err(e) = self.host.run_script(&path) {
                        warn!(
                            target: "plugin.loader",
                            path = %path.display(),
                            error = %e,
                            "script_plugin_failed"
                        );
                    }
                }
                None => trace!(target: "plugin.loader", file = file_name.as_str(), "ignored_entry"),
            }
        }

        info!(
            target: "plugin.loader",
            dir,
            components,
            scripts,
            "plugin_dir_loaded"
        );
        ScanOutcome::Loaded
    }

    /// Record that the first bulk load from the backend's search path finished.
    pub fn mark_initially_loaded(&mut self) {
        self.initially_loaded = true;
    }

    pub fn initially_loaded(&self) -> bool {
        self.initially_loaded
    }

    pub fn component_paths(&self) -> &[String] {
        &self.component_paths
    }

    pub fn plugin_dirs(&self) -> &[String] {
        &self.plugin_dirs
    }

    pub fn host(&self) -> &P {
        &self.host
    }
}

/// Sorted `(file name, path)` pairs of `plugin_dir`, or `None` when it cannot be listed.
/// Names that are not UTF-8 cannot be imported by path and are skipped.
fn list_plugin_entries(plugin_dir: &Path) -> Option<Vec<(String, PathBuf)>> {
    let read = match fs::read_dir(plugin_dir) {
        Ok(read) => read,
        Err(e) => {
            trace!(
                target: "plugin.loader",
                dir = %plugin_dir.display(),
                kind = ?e.kind(),
                "plugin_dir_unavailable"
            );
            return None;
        }
    };
    let mut entries: Vec<(String, PathBuf)> = read
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| match entry.file_name().into_string() {
            Ok(name) => Some((name, entry.path())),
            Err(raw) => {
                trace!(target: "plugin.loader", file = ?raw, "non_utf8_entry");
                None
            }
        })
        .collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Some(entries)
}
