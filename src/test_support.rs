use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    launch_error::LaunchError, launch_notifier::LaunchNotifier, stack_readiness::ReadinessCheck,
    startup_trigger::StartupTrigger, ServiceStatus,
};

/// Returns scripted statuses in order, then `fallback` forever.
pub(crate) struct ScriptedReadiness {
    script: Mutex<VecDeque<ServiceStatus>>,
    fallback: ServiceStatus,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedReadiness {
    pub(crate) fn new(script: Vec<ServiceStatus>, fallback: ServiceStatus) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn always(status: ServiceStatus) -> Self {
        Self::new(Vec::new(), status)
    }

    pub(crate) fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadinessCheck for ScriptedReadiness {
    async fn check(&self) -> ServiceStatus {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or(self.fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FakeExit {
    Success,
    ExitCode(i32),
    SpawnError,
}

/// Startup command stand-in that finishes after `runtime`.
pub(crate) struct FakeTrigger {
    runtime: Duration,
    exit: FakeExit,
    invocations: AtomicUsize,
}

impl FakeTrigger {
    pub(crate) fn new(runtime: Duration, exit: FakeExit) -> Self {
        Self {
            runtime,
            exit,
            invocations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StartupTrigger for FakeTrigger {
    async fn run(&self) -> Result<(), LaunchError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if self.exit == FakeExit::SpawnError {
            return Err(LaunchError::StartupSpawn {
                command: vec!["bin/up".to_string(), "-d".to_string()],
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        tokio::time::sleep(self.runtime).await;
        match self.exit {
            FakeExit::ExitCode(code) => Err(LaunchError::StartupExit { code }),
            FakeExit::Success | FakeExit::SpawnError => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RecordedEvent {
    StatusUpdate(String),
    AlreadyRunning,
    Started,
    Error(String),
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingNotifier {
    pub(crate) fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().expect("events lock").clone()
    }

    pub(crate) fn terminal_events(&self) -> Vec<RecordedEvent> {
        self.events()
            .into_iter()
            .filter(|event| !matches!(event, RecordedEvent::StatusUpdate(_)))
            .collect()
    }

    fn push(&self, event: RecordedEvent) {
        self.events.lock().expect("events lock").push(event);
    }
}

impl LaunchNotifier for RecordingNotifier {
    fn status_update(&self, message: &str) {
        self.push(RecordedEvent::StatusUpdate(message.to_string()));
    }

    fn already_running(&self) {
        self.push(RecordedEvent::AlreadyRunning);
    }

    fn started(&self) {
        self.push(RecordedEvent::Started);
    }

    fn error(&self, reason: &str) {
        self.push(RecordedEvent::Error(reason.to_string()));
    }
}
