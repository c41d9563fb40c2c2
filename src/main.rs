mod app_constants;
mod app_runtime;
mod app_types;
mod container_probe;
mod launch_coordinator;
mod launch_error;
mod launch_notifier;
mod launcher_config;
mod logging;
mod readiness_poller;
mod runtime_paths;
mod service_probe;
mod stack_readiness;
mod startup_trigger;
#[cfg(test)]
mod test_support;
mod ui_redirect;

pub(crate) use app_constants::*;
pub(crate) use app_types::{LaunchOutcome, LaunchPlan, LaunchTiming, PollConfig, ServiceStatus};

fn main() -> std::process::ExitCode {
    app_runtime::run()
}
