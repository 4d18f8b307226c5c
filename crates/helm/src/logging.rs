use std::fs::{self, OpenOptions};

use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::HelmPaths;

pub const LOG_FILE: &str = "helm.log";
const DEFAULT_FILTER: &str = "helm=info,chat_api=info,agent_store=info";

/// Routes `tracing` events to `<helm home>/logs/helm.log`.
///
/// Logs never go to the terminal, which is shared with raw-mode input. Returns `None` when
/// the file cannot be opened; helm keeps running without logs.
pub fn init(paths: &HelmPaths) -> Option<WorkerGuard> {
    let log_dir = paths.log_dir();
    if let Err(error) = fs::create_dir_all(&log_dir) {
        eprintln!(
            "warning: logging disabled, cannot create {}: {error}",
            log_dir.display()
        );
        return None;
    }

    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let log_path = log_dir.join(LOG_FILE);
    let file = match options.open(&log_path) {
        Ok(file) => file,
        Err(error) => {
            eprintln!(
                "warning: logging disabled, cannot open {}: {error}",
                log_path.display()
            );
            return None;
        }
    };

    let (writer, guard) = non_blocking(file);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter);
    if tracing_subscriber::registry().with(layer).try_init().is_err() {
        return None;
    }
    Some(guard)
}
