//! File logging. A terminal UI owns stdout, so events go to a daily rolling
//! file through a non-blocking writer.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const FILTER_ENV: &str = "CELLKIT_LOG";
const DEFAULT_FILTER: &str = "cellkit=info";

/// Keeps the background writer alive; logs are flushed when it drops.
pub struct LoggingGuard {
    _guard: WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Filter from `CELLKIT_LOG`, then `RUST_LOG`, then `fallback`, then
/// `cellkit=info`.
pub fn env_filter(fallback: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| match fallback {
            Some(directives) => EnvFilter::try_new(directives),
            None => EnvFilter::try_new(DEFAULT_FILTER),
        })
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `dir`, or `<temp dir>/<app>/logs` when none is given.
pub fn log_dir(app: &str, dir: Option<&Path>) -> PathBuf {
    match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::temp_dir().join(app).join("logs"),
    }
}

/// Installs the global subscriber writing `<dir>/<app>.log.<date>`.
///
/// Returns `None` if the directory cannot be created or a subscriber is
/// already installed. `filter` is the settings file's log filter, used when
/// neither environment variable is set.
pub fn init(app: &str, dir: Option<&Path>, filter: Option<&str>) -> Option<LoggingGuard> {
    let log_dir = log_dir(app, dir);
    std::fs::create_dir_all(&log_dir).ok()?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, format!("{app}.log"));
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(env_filter(filter)).with(
        tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true),
    );

    if subscriber.try_init().is_err() {
        return None;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        tracing::error!(panic = %panic_info, "panic");
        previous(panic_info);
    }));

    tracing::info!(log_dir = %log_dir.display(), "tracing initialized");

    Some(LoggingGuard {
        _guard: guard,
        log_dir,
    })
}

#[cfg(test)]
#[path = "../tests/unit/logging.rs"]
mod tests;
