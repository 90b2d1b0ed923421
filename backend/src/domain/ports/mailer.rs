//! Port abstraction for outbound email.
use async_trait::async_trait;

use crate::domain::Email;

use super::define_port_error;

define_port_error! {
    /// Delivery failures reported by mail adapters.
    pub enum MailerError {
        /// The message could not be handed to the transport.
        Delivery { message: String } => "mail delivery failed: {message}",
    }
}

/// A plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    /// Sender address.
    pub from: String,
    /// Recipient.
    pub to: Email,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

/// Sends account emails such as confirmation codes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver `mail`.
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError>;
}
