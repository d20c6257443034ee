//! Delivery channel seams
//!
//! Email and push providers are external collaborators specified only at
//! this boundary. The recording implementations are the test doubles:
//! they capture sends, inject per-recipient failures, and simulate slow
//! providers for the timeout path.

use async_trait::async_trait;
use atrium_core::{AtriumError, PrincipalId, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;

/// Transactional email provider
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one rendered email to one recipient
    async fn send_email(&self, recipient: PrincipalId, title: &str, body: &str) -> Result<()>;
}

/// Push-notification provider
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Send one push payload to one recipient's registered devices
    async fn send_push(
        &self,
        recipient: PrincipalId,
        title: &str,
        payload: &serde_json::Value,
    ) -> Result<()>;
}

/// Recording email sender for tests
#[derive(Debug, Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<(PrincipalId, String)>>,
    fail_for: Mutex<HashSet<PrincipalId>>,
    delay: Mutex<Option<Duration>>,
}

impl RecordingEmailSender {
    /// Create a sender that accepts everything instantly
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every send addressed to `recipient`
    pub fn fail_for(&self, recipient: PrincipalId) {
        self.fail_for.lock().insert(recipient);
    }

    /// Delay every send by `delay` (for exercising delivery timeouts)
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Recipients of accepted sends, in order
    pub fn sent_to(&self) -> Vec<PrincipalId> {
        self.sent.lock().iter().map(|(r, _)| *r).collect()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_email(&self, recipient: PrincipalId, title: &str, _body: &str) -> Result<()> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_for.lock().contains(&recipient) {
            return Err(AtriumError::delivery(format!(
                "email provider rejected send to {recipient}"
            )));
        }
        self.sent.lock().push((recipient, title.to_string()));
        Ok(())
    }
}

/// Recording push sender for tests
#[derive(Debug, Default)]
pub struct RecordingPushSender {
    sent: Mutex<Vec<PrincipalId>>,
    fail_for: Mutex<HashSet<PrincipalId>>,
}

impl RecordingPushSender {
    /// Create a sender that accepts everything instantly
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every send addressed to `recipient`
    pub fn fail_for(&self, recipient: PrincipalId) {
        self.fail_for.lock().insert(recipient);
    }

    /// Recipients of accepted sends, in order
    pub fn sent_to(&self) -> Vec<PrincipalId> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl PushSender for RecordingPushSender {
    async fn send_push(
        &self,
        recipient: PrincipalId,
        _title: &str,
        _payload: &serde_json::Value,
    ) -> Result<()> {
        if self.fail_for.lock().contains(&recipient) {
            return Err(AtriumError::delivery(format!(
                "push provider rejected send to {recipient}"
            )));
        }
        self.sent.lock().push(recipient);
        Ok(())
    }
}
