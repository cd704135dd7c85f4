use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
    Mutex,
};

use crate::traits::{EmailMessage, Notifier, NotifierError};

/// A [`Notifier`] that remembers every message it was asked to send. It can be told to fail, in which case the attempt
/// is still recorded.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    attempts: Arc<Mutex<Vec<EmailMessage>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> Vec<EmailMessage> {
        self.attempts.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifierError> {
        self.attempts.lock().unwrap().push(message);
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifierError::TransportError("Mail transport is down".into()));
        }
        Ok(())
    }
}
