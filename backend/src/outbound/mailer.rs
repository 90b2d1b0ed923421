//! Mail adapters.
//!
//! [`TracingMailer`] writes each message to the log instead of delivering it,
//! which is how the service runs without an SMTP relay. [`RecordingMailer`]
//! keeps messages in memory so tests can read confirmation codes back.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::domain::Email;
use crate::domain::ports::{Mailer, MailerError, OutgoingMail};

/// Logs outgoing mail through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError> {
        info!(
            from = %mail.from,
            to = %mail.to,
            subject = %mail.subject,
            body = %mail.body,
            "outgoing mail"
        );
        Ok(())
    }
}

/// Captures outgoing mail in memory.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message sent so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Most recent message addressed to `to`.
    pub fn last_to(&self, to: &Email) -> Option<OutgoingMail> {
        self.sent().into_iter().rev().find(|mail| &mail.to == to)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| MailerError::delivery("mail recorder lock poisoned"))?;
        sent.push(mail.clone());
        Ok(())
    }
}
