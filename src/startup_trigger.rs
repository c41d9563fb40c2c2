use std::process::Stdio;

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
};

use crate::{launch_error::LaunchError, LaunchPlan};

#[async_trait]
pub(crate) trait StartupTrigger: Send + Sync {
    /// Starts the command and resolves when it exits. A clean exit only means
    /// the command accepted the request; readiness is confirmed elsewhere.
    async fn run(&self) -> Result<(), LaunchError>;
}

pub(crate) struct ScriptStartupTrigger {
    plan: LaunchPlan,
}

impl ScriptStartupTrigger {
    pub(crate) fn new(plan: LaunchPlan) -> Self {
        Self { plan }
    }
}

#[async_trait]
impl StartupTrigger for ScriptStartupTrigger {
    async fn run(&self) -> Result<(), LaunchError> {
        let mut command = build_startup_command(&self.plan)?;
        tracing::info!(
            "starting startup command {:?} in {}",
            self.plan.debug_command(),
            self.plan.cwd.display()
        );

        let mut child = command.spawn().map_err(|source| LaunchError::StartupSpawn {
            command: self.plan.debug_command(),
            source,
        })?;

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output_lines(stdout, "stdout"));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output_lines(stderr, "stderr"));
        }

        let status = child.wait().await.map_err(LaunchError::StartupWait)?;
        tracing::info!("startup command exited with {status}");
        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(code) => Err(LaunchError::StartupExit { code }),
            None => Err(LaunchError::StartupKilled),
        }
    }
}

fn build_startup_command(plan: &LaunchPlan) -> Result<Command, LaunchError> {
    let mut command = if plan.use_shell {
        shell_command(plan)?
    } else {
        let mut command = Command::new(&plan.cmd);
        command.args(&plan.args);
        command
    };
    command
        .current_dir(&plan.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    Ok(command)
}

#[cfg(not(target_os = "windows"))]
fn shell_command(plan: &LaunchPlan) -> Result<Command, LaunchError> {
    let parts = plan.debug_command();
    let script = shlex::try_join(parts.iter().map(String::as_str)).map_err(|error| {
        LaunchError::StartupSpawn {
            command: parts.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, error.to_string()),
        }
    })?;
    let mut command = Command::new("sh");
    command.arg("-c").arg(script);
    Ok(command)
}

#[cfg(target_os = "windows")]
fn shell_command(plan: &LaunchPlan) -> Result<Command, LaunchError> {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(&plan.cmd).args(&plan.args);
    Ok(command)
}

async fn forward_output_lines<R>(reader: R, stream: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => tracing::info!(target: "startup", stream, "{line}"),
            Ok(None) => break,
            Err(error) => {
                tracing::debug!(target: "startup", stream, "stopped reading output: {error}");
                break;
            }
        }
    }
}
