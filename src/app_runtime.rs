use std::{io::IsTerminal, process::ExitCode};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    container_probe::CliContainerProbe,
    launch_coordinator::LaunchCoordinator,
    launch_notifier::{ConsoleNotifier, JsonEventNotifier, LaunchNotifier},
    launcher_config::{EventFormat, LauncherConfig},
    logging,
    service_probe::HttpServiceProbe,
    stack_readiness::ReadinessAggregator,
    startup_trigger::ScriptStartupTrigger,
    ui_redirect, APP_DISPLAY_NAME, REDIRECT_DELAY,
};

const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

pub(crate) fn run() -> ExitCode {
    let log_path = logging::init_logging();
    tracing::info!("desktop launcher starting");
    if let Some(path) = &log_path {
        tracing::info!("launcher log path: {}", path.display());
    }

    let config = match LauncherConfig::load() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!("invalid launcher configuration: {error}");
            eprintln!("Error: {error}");
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };
    tracing::info!(
        containers = ?config.containers,
        health_url = %config.health_url,
        startup = ?config.startup.debug_command(),
        "launcher configuration resolved"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            tracing::error!("failed to build async runtime: {error}");
            return ExitCode::FAILURE;
        }
    };
    runtime.block_on(run_launcher(config))
}

fn build_notifier(format: EventFormat) -> Box<dyn LaunchNotifier> {
    match format {
        EventFormat::Text => Box::new(ConsoleNotifier::new(std::io::stdout())),
        EventFormat::Json => Box::new(JsonEventNotifier::new(std::io::stdout())),
    }
}

async fn run_launcher(config: LauncherConfig) -> ExitCode {
    let notifier = build_notifier(config.event_format);

    let service_probe = match HttpServiceProbe::new(config.health_url.clone(), config.probe_timeout)
    {
        Ok(probe) => probe,
        Err(error) => {
            tracing::error!("failed to build HTTP client: {error}");
            notifier.error(&format!("Failed to initialize health check: {error}"));
            return ExitCode::FAILURE;
        }
    };
    let readiness = ReadinessAggregator::new(
        config.containers.clone(),
        CliContainerProbe::new(config.container_runtime.clone(), config.probe_timeout),
        service_probe,
    );
    let trigger = ScriptStartupTrigger::new(config.startup.clone());
    let coordinator =
        LaunchCoordinator::new(&readiness, &trigger, notifier.as_ref(), config.timing);

    let interactive = std::io::stdin().is_terminal();
    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let outcome = tokio::select! {
            outcome = coordinator.launch() => outcome,
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("launch interrupted by user");
                return ExitCode::from(EXIT_INTERRUPTED);
            }
        };
        tracing::info!("launch finished with {outcome:?}");

        if outcome.is_success() {
            if !config.open_browser {
                notifier.status_update(&format!(
                    "{APP_DISPLAY_NAME} launchpad: {}",
                    config.launchpad_url
                ));
                return ExitCode::SUCCESS;
            }
            if let Err(error) =
                ui_redirect::redirect_to_launchpad(&config.launchpad_url, REDIRECT_DELAY).await
            {
                tracing::warn!("failed to open launchpad: {error}");
                notifier.status_update(&format!(
                    "Open {} in your browser ({error})",
                    config.launchpad_url
                ));
            }
            return ExitCode::SUCCESS;
        }

        if !interactive {
            return ExitCode::FAILURE;
        }
        notifier.status_update("Press Enter to retry, or Ctrl+C to quit.");
        tokio::select! {
            line = stdin_lines.next_line() => match line {
                Ok(Some(_)) => tracing::info!("retrying launch"),
                Ok(None) => return ExitCode::FAILURE,
                Err(error) => {
                    tracing::warn!("failed to read retry prompt: {error}");
                    return ExitCode::FAILURE;
                }
            },
            _ = tokio::signal::ctrl_c() => return ExitCode::FAILURE,
        }
    }
}
