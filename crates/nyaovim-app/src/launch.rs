//! Backend launch arguments and the Ex commands the shell sends.

use core_config::EditorConfig;
use std::path::{Path, PathBuf};

/// Leading argv slots that belong to the host process, not to the editor.
pub const HOST_RESERVED_ARGS: usize = 2;

/// Arguments handed to the backend at launch: the forwarded command line minus
/// the host slots, the version announcement and, by default, `-n`.
pub fn launch_args(forwarded: &[String], version: &str, editor: &EditorConfig) -> Vec<String> {
    let mut args: Vec<String> = forwarded.iter().skip(HOST_RESERVED_ARGS).cloned().collect();
    args.push("--cmd".to_string());
    args.push(format!("let g:nyaovim_version=\"{version}\""));
    if editor.disable_swap {
        args.push("-n".to_string());
    }
    args.extend(editor.extra_args.iter().cloned());
    args
}

/// `runtime/` next to the install location (`<exe dir>/../runtime`).
pub fn bundled_runtime_dir() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|bin| bin.join("..").join("runtime"))
            .unwrap_or_else(|| PathBuf::from("runtime")),
        Err(e) => {
            tracing::warn!(target: "shell", error = %e, "current_exe_unavailable");
            PathBuf::from("runtime")
        }
    }
}

/// Characters `fnameescape()` protects in a file argument.
#[cfg(not(windows))]
const FNAME_SPECIAL: &str = " \t\n*?[{`$\\%#'\"|!<";
#[cfg(windows)]
const FNAME_SPECIAL: &str = " \t\n*?[`%#'\"|!<";

/// Characters that end or split a `:set` string value. `%` and `#` are
/// literal there, so file-name escaping would corrupt the option.
#[cfg(not(windows))]
const OPTION_SPECIAL: &str = " \\|\",";
#[cfg(windows)]
const OPTION_SPECIAL: &str = " |\",";

/// Append `dir` to the backend's runtimepath and source the bundled plugin script.
pub fn runtime_command(dir: &Path) -> String {
    format!(
        "set rtp+={} | runtime plugin/nyaovim.vim",
        escape_with(&dir.to_string_lossy(), OPTION_SPECIAL)
    )
}

pub fn edit_command(path: &Path) -> String {
    format!("edit! {}", fname_escape(&path.to_string_lossy()))
}

/// Escape `name` as a single file argument of an Ex command, matching Vim's
/// `fnameescape()`: specials get a backslash, as does a leading `+` or `>`
/// and a lone `-`.
pub fn fname_escape(name: &str) -> String {
    let escaped = escape_with(name, FNAME_SPECIAL);
    if name.starts_with(['+', '>']) || name == "-" {
        format!("\\{escaped}")
    } else {
        escaped
    }
}

fn escape_with(s: &str, special: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        if special.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
