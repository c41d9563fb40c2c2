use std::{process::Stdio, time::Duration};

use async_trait::async_trait;
use tokio::{process::Command, time};

use crate::launch_error::ProbeError;

#[async_trait]
pub(crate) trait ContainerProbe: Send + Sync {
    /// `true` iff the named container is currently running. Never fails.
    async fn is_running(&self, name: &str) -> bool;
}

/// Asks a docker-compatible CLI (`docker`, `podman`, ...) for running containers.
#[derive(Debug, Clone)]
pub(crate) struct CliContainerProbe {
    runtime: String,
    timeout: Duration,
}

impl CliContainerProbe {
    pub(crate) fn new(runtime: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runtime: runtime.into(),
            timeout,
        }
    }

    async fn running_container_names(&self, name: &str) -> Result<Vec<String>, ProbeError> {
        // A runtime stuck on its daemon socket must not stall the poll; the
        // child is killed when the timed-out future is dropped.
        let pending = Command::new(&self.runtime)
            .args(["ps", "--filter"])
            .arg(format!("name={name}"))
            .args(["--format", "{{.Names}}"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = time::timeout(self.timeout, pending)
            .await
            .map_err(|_| ProbeError::RuntimeTimedOut {
                runtime: self.runtime.clone(),
                timeout: self.timeout,
            })?
            .map_err(|source| ProbeError::RuntimeUnavailable {
                runtime: self.runtime.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::RuntimeFailed {
                runtime: self.runtime.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_container_names(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[async_trait]
impl ContainerProbe for CliContainerProbe {
    async fn is_running(&self, name: &str) -> bool {
        match self.running_container_names(name).await {
            Ok(names) => names.iter().any(|candidate| candidate == name),
            Err(error) => {
                tracing::debug!("container probe for '{name}' treated as not running: {error}");
                false
            }
        }
    }
}

/// The runtime's name filter matches substrings; callers compare exact names.
pub(crate) fn parse_container_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
