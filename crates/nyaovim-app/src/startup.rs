//! Process-level startup glue for embedders: file logging and the panic hook.

use anyhow::Result;
use std::path::Path;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;

pub const LOG_FILE_NAME: &str = "nyaovim.log";

/// Install a global `tracing` subscriber writing to `<log_dir>/nyaovim.log`,
/// filtered by `RUST_LOG`. The previous log is replaced. Returns the writer
/// guard to keep alive for the process lifetime, or `None` when a global
/// subscriber was already installed.
pub fn configure_logging(log_dir: &Path) -> Result<Option<WorkerGuard>> {
    let log_path = log_dir.join(LOG_FILE_NAME);
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        // Global tracing subscriber already installed; dropping the guard shuts the writer down.
        Err(_err) => Ok(None),
    }
}

pub fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}
