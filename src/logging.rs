use std::{
    env,
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{runtime_paths, LAUNCHER_LOG_FILE};

const DEFAULT_LOG_FILTER: &str = "overleaf_desktop=info,startup=info";

pub(crate) fn resolve_launcher_log_path(
    launcher_root_dir: Option<PathBuf>,
    log_file_name: &str,
) -> PathBuf {
    runtime_paths::launcher_log_dir(launcher_root_dir.as_deref()).join(log_file_name)
}

fn open_log_file(path: &Path) -> Result<File, String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create log directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| format!("Failed to open log file {}: {}", path.display(), error))
}

fn json_console_requested() -> bool {
    env::var("RUST_LOG_FORMAT")
        .map(|value| value.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Installs the global subscriber: stderr plus an append-only launcher log.
/// Returns the log path when the file layer is active.
pub(crate) fn init_logging() -> Option<PathBuf> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_layer = if json_console_requested() {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed()
    };

    let log_path = resolve_launcher_log_path(
        runtime_paths::default_launcher_root_dir(),
        LAUNCHER_LOG_FILE,
    );
    let (file_layer, file_error) = match open_log_file(&log_path) {
        Ok(file) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .boxed(),
            ),
            None,
        ),
        Err(error) => (None, Some(error)),
    };
    let file_active = file_layer.is_some();

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        return None;
    }

    if let Some(error) = file_error {
        tracing::warn!("launcher log file disabled: {error}");
    }
    file_active.then_some(log_path)
}
