use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::{
    runtime_paths, LaunchPlan, LaunchTiming, PollConfig, CONTAINERS_ENV, CONTAINER_RUNTIME_ENV,
    DEFAULT_CONTAINERS, DEFAULT_CONTAINER_RUNTIME, DEFAULT_GRACE_DELAY, DEFAULT_HEALTH_URL,
    DEFAULT_LAUNCHPAD_URL, DEFAULT_POLL_INTERVAL, DEFAULT_PRIMARY_POLL_ATTEMPTS,
    DEFAULT_PROBE_TIMEOUT, DEFAULT_SECONDARY_POLL_ATTEMPTS, DEFAULT_STARTUP_ARGS,
    DEFAULT_STARTUP_SCRIPT, EVENT_FORMAT_ENV, GRACE_DELAY_ENV, HEALTH_URL_ENV,
    LAUNCHPAD_URL_ENV, OPEN_BROWSER_ENV, POLL_ATTEMPTS_ENV, POLL_INTERVAL_ENV,
    PROBE_TIMEOUT_ENV, SECONDARY_POLL_ATTEMPTS_ENV, STARTUP_CMD_ENV, TOOLKIT_DIR_ENV,
};

#[derive(Error, Debug)]
pub(crate) enum ConfigError {
    #[error("poll attempts must be greater than zero")]
    ZeroAttempts,

    #[error("container names must not be empty")]
    EmptyContainerName,

    #[error("invalid URL in {key}: '{value}' ({reason})")]
    InvalidUrl {
        key: String,
        value: String,
        reason: String,
    },

    #[error("unsupported URL scheme '{scheme}' in {key}, only http/https are allowed")]
    UnsupportedUrlScheme { key: String, scheme: String },

    #[error("invalid number in {key}: '{value}'")]
    InvalidNumber { key: String, value: String },

    #[error("invalid startup command: '{value}'")]
    InvalidStartupCommand { value: String },

    #[error("invalid event format '{value}', expected 'text' or 'json'")]
    InvalidEventFormat { value: String },

    #[error("failed to read launcher config {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse launcher config {path}: {source}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum EventFormat {
    #[default]
    Text,
    Json,
}

impl EventFormat {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidEventFormat {
                value: raw.to_string(),
            }),
        }
    }
}

/// On-disk shape of `launcher.json`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct LauncherConfigFile {
    pub(crate) toolkit_dir: Option<PathBuf>,
    pub(crate) startup_command: Option<String>,
    pub(crate) container_runtime: Option<String>,
    pub(crate) containers: Option<Vec<String>>,
    pub(crate) health_url: Option<String>,
    pub(crate) launchpad_url: Option<String>,
    pub(crate) probe_timeout_ms: Option<u64>,
    pub(crate) grace_delay_ms: Option<u64>,
    pub(crate) poll_attempts: Option<u32>,
    pub(crate) poll_interval_ms: Option<u64>,
    pub(crate) secondary_poll_attempts: Option<u32>,
    pub(crate) open_browser: Option<bool>,
    pub(crate) event_format: Option<EventFormat>,
}

impl LauncherConfigFile {
    pub(crate) fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LauncherConfig {
    pub(crate) startup: LaunchPlan,
    pub(crate) container_runtime: String,
    pub(crate) containers: Vec<String>,
    pub(crate) health_url: Url,
    pub(crate) launchpad_url: Url,
    pub(crate) probe_timeout: Duration,
    pub(crate) timing: LaunchTiming,
    pub(crate) open_browser: bool,
    pub(crate) event_format: EventFormat,
}

impl LauncherConfig {
    /// Defaults, then the config file (if any), then process environment.
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let launcher_root_dir = runtime_paths::default_launcher_root_dir();
        let file = match runtime_paths::resolve_config_path(launcher_root_dir.as_deref()) {
            Some(path) => {
                tracing::info!("loading launcher config from {}", path.display());
                LauncherConfigFile::read(&path)?
            }
            None => LauncherConfigFile::default(),
        };
        Self::resolve(file, |key| env::var(key).ok())
    }

    pub(crate) fn resolve<F>(file: LauncherConfigFile, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let toolkit_dir = lookup(TOOLKIT_DIR_ENV)
            .map(PathBuf::from)
            .or(file.toolkit_dir)
            .unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let startup = match lookup(STARTUP_CMD_ENV).or(file.startup_command) {
            Some(custom_cmd) => resolve_custom_startup(&custom_cmd, toolkit_dir)?,
            None => default_startup_plan(toolkit_dir),
        };

        let container_runtime = lookup(CONTAINER_RUNTIME_ENV)
            .or(file.container_runtime)
            .unwrap_or_else(|| DEFAULT_CONTAINER_RUNTIME.to_string());

        let containers = match lookup(CONTAINERS_ENV) {
            Some(raw) => parse_container_list(&raw),
            None => file.containers.unwrap_or_else(|| {
                DEFAULT_CONTAINERS
                    .iter()
                    .map(|name| name.to_string())
                    .collect()
            }),
        };
        if containers.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::EmptyContainerName);
        }

        let health_url = normalize_http_url(
            HEALTH_URL_ENV,
            &lookup(HEALTH_URL_ENV)
                .or(file.health_url)
                .unwrap_or_else(|| DEFAULT_HEALTH_URL.to_string()),
        )?;
        let launchpad_url = normalize_http_url(
            LAUNCHPAD_URL_ENV,
            &lookup(LAUNCHPAD_URL_ENV)
                .or(file.launchpad_url)
                .unwrap_or_else(|| DEFAULT_LAUNCHPAD_URL.to_string()),
        )?;

        let probe_timeout = millis_setting(
            PROBE_TIMEOUT_ENV,
            lookup(PROBE_TIMEOUT_ENV),
            file.probe_timeout_ms,
            DEFAULT_PROBE_TIMEOUT,
        )?;
        let grace_delay = millis_setting(
            GRACE_DELAY_ENV,
            lookup(GRACE_DELAY_ENV),
            file.grace_delay_ms,
            DEFAULT_GRACE_DELAY,
        )?;
        let poll_interval = millis_setting(
            POLL_INTERVAL_ENV,
            lookup(POLL_INTERVAL_ENV),
            file.poll_interval_ms,
            DEFAULT_POLL_INTERVAL,
        )?;
        let primary_attempts = match lookup(POLL_ATTEMPTS_ENV) {
            Some(raw) => parse_number::<u32>(POLL_ATTEMPTS_ENV, &raw)?,
            None => file.poll_attempts.unwrap_or(DEFAULT_PRIMARY_POLL_ATTEMPTS),
        };
        let secondary_attempts = match lookup(SECONDARY_POLL_ATTEMPTS_ENV) {
            Some(raw) => parse_number::<u32>(SECONDARY_POLL_ATTEMPTS_ENV, &raw)?,
            None => file
                .secondary_poll_attempts
                .unwrap_or(DEFAULT_SECONDARY_POLL_ATTEMPTS),
        };

        let open_browser = match lookup(OPEN_BROWSER_ENV) {
            Some(raw) => !matches!(raw.to_ascii_lowercase().as_str(), "0" | "false" | "no"),
            None => file.open_browser.unwrap_or(true),
        };
        let event_format = match lookup(EVENT_FORMAT_ENV) {
            Some(raw) => EventFormat::parse(&raw)?,
            None => file.event_format.unwrap_or_default(),
        };

        Ok(Self {
            startup,
            container_runtime,
            containers,
            health_url,
            launchpad_url,
            probe_timeout,
            timing: LaunchTiming {
                primary: PollConfig::new(primary_attempts, poll_interval)?,
                secondary: PollConfig::new(secondary_attempts, poll_interval)?,
                grace_delay,
            },
            open_browser,
            event_format,
        })
    }
}

fn default_startup_plan(toolkit_dir: PathBuf) -> LaunchPlan {
    let script = DEFAULT_STARTUP_SCRIPT
        .split('/')
        .fold(toolkit_dir.clone(), |path, part| path.join(part));
    LaunchPlan {
        cmd: script.to_string_lossy().to_string(),
        args: DEFAULT_STARTUP_ARGS.iter().map(|arg| arg.to_string()).collect(),
        cwd: toolkit_dir,
        use_shell: true,
    }
}

fn resolve_custom_startup(custom_cmd: &str, toolkit_dir: PathBuf) -> Result<LaunchPlan, ConfigError> {
    let mut pieces = shlex::split(custom_cmd).ok_or_else(|| ConfigError::InvalidStartupCommand {
        value: custom_cmd.to_string(),
    })?;
    if pieces.is_empty() {
        return Err(ConfigError::InvalidStartupCommand {
            value: custom_cmd.to_string(),
        });
    }

    let cmd = pieces.remove(0);
    Ok(LaunchPlan {
        cmd,
        args: pieces,
        cwd: toolkit_dir,
        use_shell: false,
    })
}

fn parse_container_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn normalize_http_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let mut parsed = Url::parse(trimmed).map_err(|error| ConfigError::InvalidUrl {
        key: key.to_string(),
        value: trimmed.to_string(),
        reason: error.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ConfigError::UnsupportedUrlScheme {
                key: key.to_string(),
                scheme: scheme.to_string(),
            });
        }
    }
    if parsed.path().is_empty() {
        parsed.set_path("/");
    }
    Ok(parsed)
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: raw.to_string(),
        })
}

fn millis_setting(
    key: &str,
    env_value: Option<String>,
    file_value: Option<u64>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match env_value {
        Some(raw) => parse_number::<u64>(key, &raw).map(Duration::from_millis),
        None => Ok(file_value.map(Duration::from_millis).unwrap_or(default)),
    }
}
