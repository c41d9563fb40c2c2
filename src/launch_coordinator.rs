//! One launch attempt: check, start, poll, resolve exactly once.
//!
//! After a failed initial check the startup command runs while the
//! coordinator waits. A clean exit starts the primary poll. If the command is
//! still running once the grace delay has passed, a shorter secondary poll
//! runs next to it so a stack that is already healthy is noticed without
//! waiting for the script. The first path to resolve wins and the others are
//! dropped.

use crate::{
    launch_error::LaunchError,
    launch_notifier::{LaunchNotifier, TerminalLatch},
    readiness_poller::{PollOutcome, PollProgress, ReadinessPoller},
    stack_readiness::ReadinessCheck,
    startup_trigger::StartupTrigger,
    LaunchOutcome, LaunchTiming, PollConfig, APP_DISPLAY_NAME,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LaunchState {
    Checking,
    AlreadyReady,
    Starting,
    Polling,
    Ready,
    Failed,
}

impl LaunchState {
    fn for_outcome(outcome: &LaunchOutcome) -> Self {
        match outcome {
            LaunchOutcome::AlreadyRunning => Self::AlreadyReady,
            LaunchOutcome::Started => Self::Ready,
            LaunchOutcome::TimedOut { .. } | LaunchOutcome::Failed(_) => Self::Failed,
        }
    }
}

pub(crate) struct LaunchCoordinator<'a> {
    readiness: &'a dyn ReadinessCheck,
    trigger: &'a dyn StartupTrigger,
    notifier: &'a dyn LaunchNotifier,
    timing: LaunchTiming,
}

impl<'a> LaunchCoordinator<'a> {
    pub(crate) fn new(
        readiness: &'a dyn ReadinessCheck,
        trigger: &'a dyn StartupTrigger,
        notifier: &'a dyn LaunchNotifier,
        timing: LaunchTiming,
    ) -> Self {
        Self {
            readiness,
            trigger,
            notifier,
            timing,
        }
    }

    pub(crate) async fn launch(&self) -> LaunchOutcome {
        let latch = TerminalLatch::new(self.notifier);

        enter_state(LaunchState::Checking);
        latch.status_update(&format!("Checking {APP_DISPLAY_NAME} status..."));
        let outcome = if self.readiness.check().await.all_ready {
            LaunchOutcome::AlreadyRunning
        } else {
            enter_state(LaunchState::Starting);
            latch.status_update(&format!("Starting {APP_DISPLAY_NAME}..."));
            self.start_and_wait(&latch).await
        };

        enter_state(LaunchState::for_outcome(&outcome));
        latch.resolve(&outcome);
        outcome
    }

    async fn start_and_wait(&self, latch: &TerminalLatch<'_>) -> LaunchOutcome {
        let mut startup = self.trigger.run();

        tokio::select! {
            result = &mut startup => {
                return match result {
                    Ok(()) => self.primary_poll(latch).await,
                    Err(error) => startup_failed(error),
                };
            }
            () = tokio::time::sleep(self.timing.grace_delay) => {}
        }

        tracing::info!(
            "startup command still running after {}ms, starting secondary poll",
            self.timing.grace_delay.as_millis()
        );
        latch.status_update(&format!(
            "Startup script is still running, checking whether {APP_DISPLAY_NAME} is already up..."
        ));
        let secondary = self.poll(self.timing.secondary, "secondary", latch);
        tokio::pin!(secondary);
        let mut secondary_finished = false;

        loop {
            tokio::select! {
                result = &mut startup => {
                    if let Err(error) = result {
                        return startup_failed(error);
                    }
                    break;
                }
                outcome = &mut secondary, if !secondary_finished => {
                    if outcome.is_ready() {
                        return LaunchOutcome::Started;
                    }
                    secondary_finished = true;
                }
            }
        }

        if secondary_finished {
            return self.primary_poll(latch).await;
        }

        let primary = self.primary_poll(latch);
        tokio::pin!(primary);
        loop {
            tokio::select! {
                outcome = &mut primary => return outcome,
                outcome = &mut secondary, if !secondary_finished => {
                    if outcome.is_ready() {
                        return LaunchOutcome::Started;
                    }
                    secondary_finished = true;
                }
            }
        }
    }

    async fn primary_poll(&self, latch: &TerminalLatch<'_>) -> LaunchOutcome {
        enter_state(LaunchState::Polling);
        latch.status_update(&format!(
            "Startup command finished, waiting for {APP_DISPLAY_NAME} to respond..."
        ));
        match self.poll(self.timing.primary, "primary", latch).await {
            PollOutcome::Ready { attempt, status } => {
                tracing::info!(?status, "service ready after {attempt} primary attempts");
                LaunchOutcome::Started
            }
            PollOutcome::Exhausted {
                attempts,
                last_status,
            } => {
                tracing::warn!(?last_status, "service not ready after {attempts} primary attempts");
                LaunchOutcome::TimedOut {
                    containers_running: last_status.containers_running,
                }
            }
        }
    }

    async fn poll(
        &self,
        config: PollConfig,
        label: &'static str,
        latch: &TerminalLatch<'_>,
    ) -> PollOutcome {
        ReadinessPoller::new(config, label)
            .run(self.readiness, |progress: &PollProgress| {
                latch.status_update(&progress.message())
            })
            .await
    }
}

fn enter_state(state: LaunchState) {
    tracing::debug!(?state, "launch state changed");
}

fn startup_failed(error: LaunchError) -> LaunchOutcome {
    tracing::error!("startup command failed: {error}");
    LaunchOutcome::Failed(error.to_string())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        test_support::{FakeExit, FakeTrigger, RecordedEvent, RecordingNotifier, ScriptedReadiness},
        ServiceStatus,
    };

    const GRACE: Duration = Duration::from_secs(10);
    const INTERVAL: Duration = Duration::from_secs(2);

    fn timing(primary_attempts: u32, secondary_attempts: u32) -> LaunchTiming {
        LaunchTiming {
            primary: PollConfig::new(primary_attempts, INTERVAL).expect("valid poll config"),
            secondary: PollConfig::new(secondary_attempts, INTERVAL).expect("valid poll config"),
            grace_delay: GRACE,
        }
    }

    fn down() -> ServiceStatus {
        ServiceStatus::new(false, false)
    }

    fn containers_only() -> ServiceStatus {
        ServiceStatus::new(true, false)
    }

    #[tokio::test(start_paused = true)]
    async fn already_ready_never_invokes_trigger() {
        let readiness = ScriptedReadiness::always(ServiceStatus::ready());
        let trigger = FakeTrigger::new(Duration::from_secs(1), FakeExit::Success);
        let notifier = RecordingNotifier::default();

        let outcome = LaunchCoordinator::new(&readiness, &trigger, &notifier, timing(5, 3))
            .launch()
            .await;

        assert_eq!(outcome, LaunchOutcome::AlreadyRunning);
        assert_eq!(trigger.invocations(), 0);
        assert_eq!(readiness.calls(), 1);
        assert_eq!(notifier.terminal_events(), vec![RecordedEvent::AlreadyRunning]);
    }

    #[tokio::test(start_paused = true)]
    async fn clean_exit_then_primary_poll_reports_started() {
        let readiness = ScriptedReadiness::new(
            vec![down(), down(), containers_only(), ServiceStatus::ready()],
            down(),
        );
        let trigger = FakeTrigger::new(Duration::from_secs(3), FakeExit::Success);
        let notifier = RecordingNotifier::default();

        let outcome = LaunchCoordinator::new(&readiness, &trigger, &notifier, timing(5, 3))
            .launch()
            .await;

        assert_eq!(outcome, LaunchOutcome::Started);
        assert_eq!(trigger.invocations(), 1);
        // Initial check plus three primary attempts.
        assert_eq!(readiness.calls(), 4);
        assert_eq!(notifier.terminal_events(), vec![RecordedEvent::Started]);
        assert!(notifier.events().contains(&RecordedEvent::StatusUpdate(
            "Containers are running, waiting for Overleaf to respond... (2/5)".to_string()
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn nonzero_exit_before_grace_fails_without_polling() {
        let readiness = ScriptedReadiness::always(down());
        let trigger = FakeTrigger::new(Duration::from_secs(1), FakeExit::ExitCode(1));
        let notifier = RecordingNotifier::default();

        let outcome = LaunchCoordinator::new(&readiness, &trigger, &notifier, timing(5, 3))
            .launch()
            .await;

        assert_eq!(
            outcome,
            LaunchOutcome::Failed("Process exited with code 1".to_string())
        );
        assert_eq!(readiness.calls(), 1);
        assert_eq!(
            notifier.terminal_events(),
            vec![RecordedEvent::Error("Process exited with code 1".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn spawn_error_fails_immediately() {
        let readiness = ScriptedReadiness::always(down());
        let trigger = FakeTrigger::new(Duration::ZERO, FakeExit::SpawnError);
        let notifier = RecordingNotifier::default();

        let outcome = LaunchCoordinator::new(&readiness, &trigger, &notifier, timing(5, 3))
            .launch()
            .await;

        let LaunchOutcome::Failed(reason) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(reason.contains("Failed to spawn startup command"));
        assert!(!notifier.events().contains(&RecordedEvent::Started));
    }

    #[tokio::test(start_paused = true)]
    async fn nonzero_exit_during_secondary_poll_stops_polling() {
        let readiness = ScriptedReadiness::always(down());
        let trigger = FakeTrigger::new(Duration::from_secs(13), FakeExit::ExitCode(4));
        let notifier = RecordingNotifier::default();

        let outcome = LaunchCoordinator::new(&readiness, &trigger, &notifier, timing(5, 10))
            .launch()
            .await;

        assert_eq!(
            outcome,
            LaunchOutcome::Failed("Process exited with code 4".to_string())
        );
        // Initial check plus secondary attempts at 10s and 12s.
        assert_eq!(readiness.calls(), 3);
        let calls_at_resolution = readiness.calls();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(readiness.calls(), calls_at_resolution);
        assert!(!notifier.events().contains(&RecordedEvent::Started));
        assert_eq!(notifier.terminal_events().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn secondary_poll_wins_while_script_still_running() {
        let readiness = ScriptedReadiness::new(vec![down()], ServiceStatus::ready());
        let trigger = FakeTrigger::new(Duration::from_secs(3_600), FakeExit::Success);
        let notifier = RecordingNotifier::default();

        let started = tokio::time::Instant::now();
        let outcome = LaunchCoordinator::new(&readiness, &trigger, &notifier, timing(5, 3))
            .launch()
            .await;

        assert_eq!(outcome, LaunchOutcome::Started);
        assert!(started.elapsed() < Duration::from_secs(11));
        assert_eq!(readiness.calls(), 2);
        assert_eq!(notifier.terminal_events(), vec![RecordedEvent::Started]);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_secondary_poll_keeps_waiting_for_script() {
        let readiness = ScriptedReadiness::new(
            // Initial check, then three secondary attempts, then the primary poll.
            vec![down(), down(), down(), down()],
            ServiceStatus::ready(),
        );
        let trigger = FakeTrigger::new(Duration::from_secs(30), FakeExit::Success);
        let notifier = RecordingNotifier::default();

        let started = tokio::time::Instant::now();
        let outcome = LaunchCoordinator::new(&readiness, &trigger, &notifier, timing(5, 3))
            .launch()
            .await;

        assert_eq!(outcome, LaunchOutcome::Started);
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert_eq!(readiness.calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn primary_exhaustion_times_out_with_container_state() {
        let readiness = ScriptedReadiness::always(containers_only());
        let trigger = FakeTrigger::new(Duration::from_secs(1), FakeExit::Success);
        let notifier = RecordingNotifier::default();

        let outcome = LaunchCoordinator::new(&readiness, &trigger, &notifier, timing(4, 3))
            .launch()
            .await;

        assert_eq!(
            outcome,
            LaunchOutcome::TimedOut {
                containers_running: true
            }
        );
        assert_eq!(readiness.calls(), 5);
        assert_eq!(
            notifier.terminal_events(),
            vec![RecordedEvent::Error(
                "Overleaf started but the service is not responding.".to_string()
            )]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn primary_and_secondary_race_resolves_once() {
        // The script exits while a secondary probe is in flight, so both polls overlap.
        let readiness = ScriptedReadiness::new(vec![down(), down()], ServiceStatus::ready())
            .with_probe_delay(Duration::from_millis(1_500));
        let trigger = FakeTrigger::new(Duration::from_secs(11), FakeExit::Success);
        let notifier = RecordingNotifier::default();

        let outcome = LaunchCoordinator::new(&readiness, &trigger, &notifier, timing(5, 5))
            .launch()
            .await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(outcome, LaunchOutcome::Started);
        assert_eq!(notifier.terminal_events(), vec![RecordedEvent::Started]);
        let events = notifier.events();
        let started_index = events
            .iter()
            .position(|event| *event == RecordedEvent::Started)
            .expect("started event");
        assert_eq!(started_index, events.len() - 1);
    }
}
