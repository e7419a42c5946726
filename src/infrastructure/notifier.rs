use crate::domain::ports::Notifier;
use std::sync::Mutex;
use tracing::{error, info};

/// Emits notifications as log events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(target: "idpay::notify", "{message}");
    }

    fn failure(&self, message: &str) {
        error!(target: "idpay::notify", "{message}");
    }
}

/// Keeps every notification for later inspection.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    failures: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn successes(&self) -> Vec<String> {
        self.successes
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn failures(&self) -> Vec<String> {
        self.failures
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        if let Ok(mut messages) = self.successes.lock() {
            messages.push(message.to_string());
        }
    }

    fn failure(&self, message: &str) {
        if let Ok(mut messages) = self.failures.lock() {
            messages.push(message.to_string());
        }
    }
}
