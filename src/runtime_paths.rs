use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{CONFIG_PATH_ENV, LAUNCHER_CONFIG_FILE, LAUNCHER_ROOT_DIR_NAME};

pub(crate) fn default_launcher_root_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LAUNCHER_ROOT_DIR_NAME))
}

/// Explicit config path from the environment, else the default file if it exists.
pub(crate) fn resolve_config_path(launcher_root_dir: Option<&Path>) -> Option<PathBuf> {
    if let Ok(raw) = env::var(CONFIG_PATH_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    launcher_root_dir
        .map(|root| root.join(LAUNCHER_CONFIG_FILE))
        .filter(|path| path.is_file())
}

pub(crate) fn launcher_log_dir(launcher_root_dir: Option<&Path>) -> PathBuf {
    match launcher_root_dir {
        Some(root) => root.join("logs"),
        None => env::temp_dir().join(LAUNCHER_ROOT_DIR_NAME).join("logs"),
    }
}
