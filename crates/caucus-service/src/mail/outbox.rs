use std::sync::Arc;

use caucus_db::db::DbProvider;
use caucus_db::db::query::outbound_email;
use caucus_db::model::outbound_email::NewOutboundEmail;

use super::{EmailMessage, Mailer};
use crate::error::ServiceResult;

/// Queues messages as `outbound_emails` rows. A single multi-row insert, so
/// either every message is queued or none is.
pub struct OutboxMailer {
    provider: Arc<dyn DbProvider>,
}

impl OutboxMailer {
    #[must_use]
    pub fn new(provider: Arc<dyn DbProvider>) -> Self {
        Self { provider }
    }
}

#[salvo::async_trait]
impl Mailer for OutboxMailer {
    #[tracing::instrument(skip(self, messages), fields(count = messages.len()))]
    async fn send(&self, messages: Vec<EmailMessage>) -> ServiceResult<usize> {
        if messages.is_empty() {
            return Ok(0);
        }

        let rows: Vec<NewOutboundEmail<'_>> = messages
            .iter()
            .map(|message| NewOutboundEmail {
                id: uuid::Uuid::now_v7(),
                recipient: &message.recipient,
                constituent_id: message.constituent_id,
                subject: &message.subject,
                body: &message.body,
            })
            .collect();

        let mut conn = self.provider.get_connection().await?;
        let queued = outbound_email::enqueue(&mut conn, &rows).await?;

        tracing::info!(queued, "Emails queued");

        Ok(queued)
    }
}
