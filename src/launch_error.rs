use thiserror::Error;

/// Terminal failures of the startup command.
#[derive(Error, Debug)]
pub(crate) enum LaunchError {
    #[error("Failed to spawn startup command {command:?}: {source}")]
    StartupSpawn {
        command: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    #[error("Process exited with code {code}")]
    StartupExit { code: i32 },

    #[error("Process was terminated before it could exit normally")]
    StartupKilled,

    #[error("Failed to wait for startup command: {0}")]
    StartupWait(#[source] std::io::Error),
}

/// Probe failures. These never leave the probe: they degrade to a negative result.
#[derive(Error, Debug)]
pub(crate) enum ProbeError {
    #[error("container runtime '{runtime}' is unavailable: {source}")]
    RuntimeUnavailable {
        runtime: String,
        #[source]
        source: std::io::Error,
    },

    #[error("container runtime '{runtime}' exited with {status}: {stderr}")]
    RuntimeFailed {
        runtime: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("container runtime '{runtime}' did not answer within {timeout:?}")]
    RuntimeTimedOut {
        runtime: String,
        timeout: std::time::Duration,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}
