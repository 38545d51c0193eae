//! Configuration loading and parsing.
//!
//! Parses `nyaovim.toml` (or an override path provided by the embedder). Every
//! table and key is optional; a missing file or a file that fails to parse
//! yields defaults so a broken config never blocks startup. Unknown fields are
//! ignored to allow forward evolution.
//!
//! Also resolves the user's config directory and the `nyaovimrc.html` fragment
//! living in it.

use anyhow::Result;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "nyaovim.toml";
pub const RC_FILE_NAME: &str = "nyaovimrc.html";
const APP_DIR_NAME: &str = "nyaovim";

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    /// Extra arguments appended to the backend launch arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Start the backend with `-n`. The swap-file prompt appears before the
    /// shell can observe it, so this defaults on.
    #[serde(default = "EditorConfig::default_disable_swap")]
    pub disable_swap: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            extra_args: Vec::new(),
            disable_swap: Self::default_disable_swap(),
        }
    }
}

impl EditorConfig {
    const fn default_disable_swap() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RuntimeConfig {
    /// Replaces the bundled runtime directory appended to the backend's runtimepath.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PluginsConfig {
    #[serde(default = "PluginsConfig::default_load_nyaovimrc")]
    pub load_nyaovimrc: bool,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            load_nyaovimrc: Self::default_load_nyaovimrc(),
        }
    }
}

impl PluginsConfig {
    const fn default_load_nyaovimrc() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub plugins: PluginsConfig,
}

/// Locations of user configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub nyaovimrc: PathBuf,
}

impl ConfigPaths {
    pub fn in_dir(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let nyaovimrc = config_dir.join(RC_FILE_NAME);
        Self {
            config_dir,
            nyaovimrc,
        }
    }

    /// Platform config directory (XDG / AppData Roaming) joined with `nyaovim`.
    pub fn discover() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::in_dir(dir.join(APP_DIR_NAME)))
    }

    /// `nyaovimrc.html` when it exists on disk.
    pub fn existing_nyaovimrc(&self) -> Option<&Path> {
        self.nyaovimrc.is_file().then_some(self.nyaovimrc.as_path())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // file contents as read, if any
    pub file: ConfigFile,    // parsed (or default) data
    pub paths: Option<ConfigPaths>,
}

/// Best-effort config path: local working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(paths) = ConfigPaths::discover() {
        return paths.config_dir.join(CONFIG_FILE_NAME);
    }
    // Final fallback relative filename.
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let paths = ConfigPaths::discover();
    let Ok(content) = fs::read_to_string(&path) else {
        debug!(target: "config", path = %path.display(), "config_file_absent");
        return Ok(Config {
            paths,
            ..Config::default()
        });
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
            paths,
        }),
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed");
            Ok(Config {
                paths,
                ..Config::default()
            })
        }
    }
}

impl Config {
    pub fn with_paths(mut self, paths: ConfigPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    /// The user's `nyaovimrc.html` if loading it is enabled and it exists.
    pub fn nyaovimrc(&self) -> Option<&Path> {
        if !self.file.plugins.load_nyaovimrc {
            return None;
        }
        self.paths.as_ref()?.existing_nyaovimrc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::Level;
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl<'a> Write for LockedWriter<'a> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.raw.is_none());
        assert!(cfg.file.editor.disable_swap);
        assert!(cfg.file.editor.extra_args.is_empty());
        assert!(cfg.file.runtime.dir.is_none());
        assert!(cfg.file.plugins.load_nyaovimrc);
    }

    #[test]
    fn parses_editor_and_runtime_tables() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[editor]\nextra_args = [\"-u\", \"NORC\"]\ndisable_swap = false\n\
             [runtime]\ndir = \"/opt/nyaovim/runtime\"\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file.editor.extra_args, vec!["-u", "NORC"]);
        assert!(!cfg.file.editor.disable_swap);
        assert_eq!(
            cfg.file.runtime.dir.as_deref(),
            Some(Path::new("/opt/nyaovim/runtime"))
        );
        assert!(cfg.raw.is_some());
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[window]\nwidth = 800\n[editor]\nfuture_key = 1\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.raw.is_some());
        assert!(cfg.file.editor.disable_swap);
    }

    #[test]
    fn parse_error_falls_back_and_logs_under_config_target() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[editor\nextra_args = 3").unwrap();
        let (writer, buffer) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::WARN)
            .with_target(true)
            .with_ansi(false)
            .without_time()
            .with_writer(writer)
            .finish();

        let cfg = with_default(subscriber, || load_from(Some(tmp.path().to_path_buf())).unwrap());

        let log_output = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(log_output.contains("WARN config:"));
        assert!(log_output.contains("config_parse_failed"));
        assert!(cfg.raw.is_none());
        assert!(cfg.file.editor.disable_swap);
    }

    #[test]
    fn nyaovimrc_only_when_present_and_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::in_dir(dir.path());
        assert_eq!(paths.nyaovimrc, dir.path().join(RC_FILE_NAME));

        let cfg = Config::default().with_paths(paths.clone());
        assert!(cfg.nyaovimrc().is_none(), "file absent");

        std::fs::write(&paths.nyaovimrc, "<dom-module></dom-module>").unwrap();
        assert_eq!(cfg.nyaovimrc(), Some(paths.nyaovimrc.as_path()));

        let mut disabled = cfg.clone();
        disabled.file.plugins.load_nyaovimrc = false;
        assert!(disabled.nyaovimrc().is_none());
    }
}
