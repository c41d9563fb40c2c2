use std::time::Duration;

pub(crate) const APP_DISPLAY_NAME: &str = "Overleaf";

pub(crate) const DEFAULT_HEALTH_URL: &str = "http://127.0.0.1/launchpad";
pub(crate) const DEFAULT_LAUNCHPAD_URL: &str = "http://127.0.0.1/launchpad";
pub(crate) const DEFAULT_CONTAINER_RUNTIME: &str = "docker";
pub(crate) const DEFAULT_CONTAINERS: [&str; 3] = ["sharelatex", "mongo", "redis"];
pub(crate) const DEFAULT_STARTUP_SCRIPT: &str = "bin/up";
pub(crate) const DEFAULT_STARTUP_ARGS: [&str; 1] = ["-d"];

pub(crate) const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(5_000);
pub(crate) const DEFAULT_GRACE_DELAY: Duration = Duration::from_millis(10_000);
pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2_000);
pub(crate) const DEFAULT_PRIMARY_POLL_ATTEMPTS: u32 = 60;
pub(crate) const DEFAULT_SECONDARY_POLL_ATTEMPTS: u32 = 15;
pub(crate) const REDIRECT_DELAY: Duration = Duration::from_millis(1_000);

pub(crate) const LAUNCHER_ROOT_DIR_NAME: &str = ".overleaf-desktop";
pub(crate) const LAUNCHER_CONFIG_FILE: &str = "launcher.json";
pub(crate) const LAUNCHER_LOG_FILE: &str = "launcher.log";

pub(crate) const CONFIG_PATH_ENV: &str = "OVERLEAF_LAUNCHER_CONFIG";
pub(crate) const TOOLKIT_DIR_ENV: &str = "OVERLEAF_TOOLKIT_DIR";
pub(crate) const STARTUP_CMD_ENV: &str = "OVERLEAF_STARTUP_CMD";
pub(crate) const CONTAINER_RUNTIME_ENV: &str = "OVERLEAF_CONTAINER_RUNTIME";
pub(crate) const CONTAINERS_ENV: &str = "OVERLEAF_CONTAINERS";
pub(crate) const HEALTH_URL_ENV: &str = "OVERLEAF_HEALTH_URL";
pub(crate) const LAUNCHPAD_URL_ENV: &str = "OVERLEAF_LAUNCHPAD_URL";
pub(crate) const PROBE_TIMEOUT_ENV: &str = "OVERLEAF_PROBE_TIMEOUT_MS";
pub(crate) const GRACE_DELAY_ENV: &str = "OVERLEAF_GRACE_DELAY_MS";
pub(crate) const POLL_ATTEMPTS_ENV: &str = "OVERLEAF_POLL_ATTEMPTS";
pub(crate) const POLL_INTERVAL_ENV: &str = "OVERLEAF_POLL_INTERVAL_MS";
pub(crate) const SECONDARY_POLL_ATTEMPTS_ENV: &str = "OVERLEAF_SECONDARY_POLL_ATTEMPTS";
pub(crate) const OPEN_BROWSER_ENV: &str = "OVERLEAF_OPEN_BROWSER";
pub(crate) const EVENT_FORMAT_ENV: &str = "OVERLEAF_EVENT_FORMAT";

pub(crate) const EVENT_STATUS_UPDATE: &str = "overleaf-status-update";
pub(crate) const EVENT_ALREADY_RUNNING: &str = "overleaf-already-running";
pub(crate) const EVENT_STARTED: &str = "overleaf-started";
pub(crate) const EVENT_ERROR: &str = "overleaf-error";
