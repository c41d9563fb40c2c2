use std::{
    io::Write,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, PoisonError,
    },
};

use serde::Serialize;

use crate::{
    LaunchOutcome, APP_DISPLAY_NAME, EVENT_ALREADY_RUNNING, EVENT_ERROR, EVENT_STARTED,
    EVENT_STATUS_UPDATE,
};

/// Outward channel to the presentation layer.
pub(crate) trait LaunchNotifier: Send + Sync {
    fn status_update(&self, message: &str);
    fn already_running(&self);
    fn started(&self);
    fn error(&self, reason: &str);
}

/// Guards one launch: the first terminal resolution wins and everything
/// after it, status updates included, is dropped.
pub(crate) struct TerminalLatch<'a> {
    notifier: &'a dyn LaunchNotifier,
    resolved: AtomicBool,
}

impl<'a> TerminalLatch<'a> {
    pub(crate) fn new(notifier: &'a dyn LaunchNotifier) -> Self {
        Self {
            notifier,
            resolved: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    pub(crate) fn status_update(&self, message: &str) {
        if self.is_resolved() {
            tracing::debug!("dropping status update after resolution: {message}");
            return;
        }
        self.notifier.status_update(message);
    }

    /// Returns `false` when an earlier outcome already resolved the launch.
    pub(crate) fn resolve(&self, outcome: &LaunchOutcome) -> bool {
        if self
            .resolved
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("ignoring late launch outcome {outcome:?}");
            return false;
        }

        match outcome {
            LaunchOutcome::AlreadyRunning => self.notifier.already_running(),
            LaunchOutcome::Started => self.notifier.started(),
            LaunchOutcome::TimedOut { .. } | LaunchOutcome::Failed(_) => {
                let reason = outcome
                    .failure_reason()
                    .unwrap_or_else(|| "unknown error".to_string());
                self.notifier.error(&reason);
            }
        }
        true
    }
}

fn write_line<W: Write>(writer: &Mutex<W>, line: &str) {
    let mut guard = writer.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(error) = writeln!(guard, "{line}").and_then(|_| guard.flush()) {
        tracing::warn!("failed to write launch event: {error}");
    }
}

/// Plain status text, one line per event.
pub(crate) struct ConsoleNotifier<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> ConsoleNotifier<W> {
    pub(crate) fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send> LaunchNotifier for ConsoleNotifier<W> {
    fn status_update(&self, message: &str) {
        write_line(&self.writer, message);
    }

    fn already_running(&self) {
        write_line(
            &self.writer,
            &format!("{APP_DISPLAY_NAME} is already running! Redirecting..."),
        );
    }

    fn started(&self) {
        write_line(
            &self.writer,
            &format!("{APP_DISPLAY_NAME} is ready! Redirecting to launchpad..."),
        );
    }

    fn error(&self, reason: &str) {
        write_line(&self.writer, &format!("Error: {reason}"));
    }
}

#[derive(Debug, Serialize)]
struct LaunchEventRecord<'a> {
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    at: String,
}

/// One JSON object per line for a front end reading our stdout.
pub(crate) struct JsonEventNotifier<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonEventNotifier<W> {
    pub(crate) fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn emit(&self, event: &str, message: Option<&str>) {
        let record = LaunchEventRecord {
            event,
            message,
            at: chrono::Utc::now().to_rfc3339(),
        };
        match serde_json::to_string(&record) {
            Ok(line) => write_line(&self.writer, &line),
            Err(error) => tracing::warn!("failed to serialize launch event {event}: {error}"),
        }
    }
}

impl<W: Write + Send> LaunchNotifier for JsonEventNotifier<W> {
    fn status_update(&self, message: &str) {
        self.emit(EVENT_STATUS_UPDATE, Some(message));
    }

    fn already_running(&self) {
        self.emit(EVENT_ALREADY_RUNNING, None);
    }

    fn started(&self) {
        self.emit(EVENT_STARTED, None);
    }

    fn error(&self, reason: &str) {
        self.emit(EVENT_ERROR, Some(reason));
    }
}
