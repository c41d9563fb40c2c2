use crate::{stack_readiness::ReadinessCheck, PollConfig, ServiceStatus, APP_DISPLAY_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollOutcome {
    Ready { attempt: u32, status: ServiceStatus },
    Exhausted { attempts: u32, last_status: ServiceStatus },
}

impl PollOutcome {
    pub(crate) fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Reported after every attempt that did not reach readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PollProgress {
    pub(crate) attempt: u32,
    pub(crate) max_attempts: u32,
    pub(crate) status: ServiceStatus,
}

impl PollProgress {
    pub(crate) fn message(&self) -> String {
        if self.status.containers_running {
            format!(
                "Containers are running, waiting for {APP_DISPLAY_NAME} to respond... ({}/{})",
                self.attempt, self.max_attempts
            )
        } else {
            format!(
                "Waiting for {APP_DISPLAY_NAME} containers to start... ({}/{})",
                self.attempt, self.max_attempts
            )
        }
    }
}

/// Sequential, evenly spaced readiness checks with a bounded attempt budget.
pub(crate) struct ReadinessPoller {
    config: PollConfig,
    label: &'static str,
}

impl ReadinessPoller {
    pub(crate) fn new(config: PollConfig, label: &'static str) -> Self {
        Self { config, label }
    }

    pub(crate) async fn run<R, F>(&self, readiness: &R, on_progress: F) -> PollOutcome
    where
        R: ReadinessCheck + ?Sized,
        F: Fn(&PollProgress),
    {
        let max_attempts = self.config.max_attempts();
        let mut last_status = ServiceStatus::default();

        for attempt in 1..=max_attempts {
            let status = readiness.check().await;
            if status.all_ready {
                tracing::info!("{} poll ready on attempt {attempt}/{max_attempts}", self.label);
                return PollOutcome::Ready { attempt, status };
            }

            last_status = status;
            on_progress(&PollProgress {
                attempt,
                max_attempts,
                status,
            });

            if attempt < max_attempts {
                tokio::time::sleep(self.config.interval()).await;
            }
        }

        tracing::warn!(
            containers_running = last_status.containers_running,
            service_accessible = last_status.service_accessible,
            "{} poll exhausted after {max_attempts} attempts",
            self.label
        );
        PollOutcome::Exhausted {
            attempts: max_attempts,
            last_status,
        }
    }
}
