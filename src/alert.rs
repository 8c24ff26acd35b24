//! User-facing alert dialogs.
//!
//! An [`Alerter`] is the only channel through which fetch failures and
//! [`crate::display::inspect`] reach the user. The CLI writes to stderr;
//! embedders can plug in their own surface.

use std::sync::Mutex;

pub trait Alerter: Send + Sync {
    fn alert(&self, message: &str);
}

/// Writes each alert to stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrAlerter;

impl Alerter for StderrAlerter {
    fn alert(&self, message: &str) {
        tracing::debug!(message, "alert");
        eprintln!("{message}");
    }
}

/// Records alerts in memory.
#[derive(Debug, Default)]
pub struct MemoryAlerter {
    messages: Mutex<Vec<String>>,
}

impl MemoryAlerter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts received so far, oldest first.
    pub fn messages(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Alerter for MemoryAlerter {
    fn alert(&self, message: &str) {
        match self.messages.lock() {
            Ok(mut guard) => guard.push(message.to_string()),
            Err(poisoned) => poisoned.into_inner().push(message.to_string()),
        }
    }
}
