use std::{path::PathBuf, time::Duration};

use crate::{launcher_config::ConfigError, APP_DISPLAY_NAME};

/// Snapshot of one probe cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ServiceStatus {
    pub(crate) containers_running: bool,
    pub(crate) service_accessible: bool,
    pub(crate) all_ready: bool,
}

impl ServiceStatus {
    pub(crate) fn new(containers_running: bool, service_accessible: bool) -> Self {
        Self {
            containers_running,
            service_accessible,
            all_ready: containers_running && service_accessible,
        }
    }

    #[cfg(test)]
    pub(crate) fn ready() -> Self {
        Self::new(true, true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollConfig {
    max_attempts: u32,
    interval: Duration,
}

impl PollConfig {
    pub(crate) fn new(max_attempts: u32, interval: Duration) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(Self {
            max_attempts,
            interval,
        })
    }

    pub(crate) fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LaunchTiming {
    pub(crate) primary: PollConfig,
    pub(crate) secondary: PollConfig,
    pub(crate) grace_delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LaunchOutcome {
    AlreadyRunning,
    Started,
    TimedOut { containers_running: bool },
    Failed(String),
}

impl LaunchOutcome {
    pub(crate) fn is_success(&self) -> bool {
        matches!(self, Self::AlreadyRunning | Self::Started)
    }

    /// Human-readable reason for the two failure variants.
    pub(crate) fn failure_reason(&self) -> Option<String> {
        match self {
            Self::AlreadyRunning | Self::Started => None,
            Self::TimedOut {
                containers_running: true,
            } => Some(format!(
                "{APP_DISPLAY_NAME} started but the service is not responding."
            )),
            Self::TimedOut {
                containers_running: false,
            } => Some(format!(
                "{APP_DISPLAY_NAME} containers did not come up in time."
            )),
            Self::Failed(reason) => Some(reason.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LaunchPlan {
    pub(crate) cmd: String,
    pub(crate) args: Vec<String>,
    pub(crate) cwd: PathBuf,
    pub(crate) use_shell: bool,
}

impl LaunchPlan {
    pub(crate) fn debug_command(&self) -> Vec<String> {
        let mut parts = vec![self.cmd.clone()];
        parts.extend(self.args.clone());
        parts
    }
}
