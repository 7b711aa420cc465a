//! Bulk email to constituents.
//!
//! Delivery sits behind the [`Mailer`] trait. [`OutboxMailer`] queues
//! messages in `outbound_emails` for an external sender to pick up.

mod bulk;
mod outbox;

pub use bulk::{BulkEmail, BulkEmailInput, RecipientTarget, Recipients, send_bulk_email};
pub use outbox::OutboxMailer;

use crate::error::ServiceResult;

/// One message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub recipient: String,
    pub constituent_id: Option<i32>,
    pub subject: String,
    pub body: String,
}

#[salvo::async_trait]
pub trait Mailer: Send + Sync {
    /// ## Summary
    /// Hands messages over for delivery and returns how many were accepted.
    ///
    /// ## Errors
    /// Returns an error if the messages could not be accepted; none are sent.
    async fn send(&self, messages: Vec<EmailMessage>) -> ServiceResult<usize>;
}
