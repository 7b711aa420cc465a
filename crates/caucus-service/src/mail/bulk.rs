use serde::Deserialize;

use caucus_db::db::DbProvider;
use caucus_db::db::query::constituent;
use caucus_db::model::constituent::Constituent;
use diesel_async::RunQueryDsl;

use super::{EmailMessage, Mailer};
use crate::error::ServiceResult;
use crate::validation::{Violations, non_blank};

/// `"all"` or a list of constituent IDs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    Keyword(String),
    Ids(Vec<i32>),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BulkEmailInput {
    pub recipients: Option<Recipients>,
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientTarget {
    /// Every constituent whose status is 0.
    AllActive,
    Ids(Vec<i32>),
}

/// A validated bulk email request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkEmail {
    pub target: RecipientTarget,
    pub subject: String,
    pub body: String,
}

impl BulkEmailInput {
    /// ## Summary
    /// Validates the request, collecting every violation.
    ///
    /// ## Errors
    /// Returns all violations when recipients are missing, empty or not
    /// `"all"`, or the subject or body is blank.
    pub fn validate(&self) -> Result<BulkEmail, Violations> {
        let mut violations = Violations::new();

        let target = match &self.recipients {
            None => {
                violations.push("recipients", "Recipients are required");
                None
            }
            Some(Recipients::Keyword(keyword)) if keyword.trim().eq_ignore_ascii_case("all") => {
                Some(RecipientTarget::AllActive)
            }
            Some(Recipients::Keyword(_)) => {
                violations.push("recipients", "Recipients must be \"all\" or a list of IDs");
                None
            }
            Some(Recipients::Ids(ids)) if ids.is_empty() => {
                violations.push("recipients", "At least one recipient is required");
                None
            }
            Some(Recipients::Ids(ids)) => {
                let mut ids = ids.clone();
                ids.sort_unstable();
                ids.dedup();
                Some(RecipientTarget::Ids(ids))
            }
        };

        let subject = non_blank(self.subject.as_deref());
        if subject.is_none() {
            violations.push("subject", "Subject is required");
        }
        let body = non_blank(self.body.as_deref());
        if body.is_none() {
            violations.push("body", "Body is required");
        }

        match (target, subject, body) {
            (Some(target), Some(subject), Some(body)) if violations.is_empty() => Ok(BulkEmail {
                target,
                subject: subject.to_owned(),
                body: body.to_owned(),
            }),
            _ => Err(violations),
        }
    }
}

impl BulkEmail {
    fn messages_for(&self, constituents: Vec<Constituent>) -> Vec<EmailMessage> {
        constituents
            .into_iter()
            .map(|constituent| EmailMessage {
                recipient: constituent.email,
                constituent_id: Some(constituent.id),
                subject: self.subject.clone(),
                body: self.body.clone(),
            })
            .collect()
    }
}

/// ## Summary
/// Resolves the recipients and hands one message per constituent to `mailer`.
///
/// Unknown IDs are skipped. The database connection is released before the
/// mailer runs.
///
/// ## Errors
/// Returns a database error if recipients cannot be loaded, or any error from
/// the mailer.
#[tracing::instrument(skip(provider, mailer, email), fields(target = ?email.target))]
pub async fn send_bulk_email(
    provider: &dyn DbProvider,
    mailer: &dyn Mailer,
    email: &BulkEmail,
) -> ServiceResult<usize> {
    let constituents = {
        let mut conn = provider.get_connection().await?;
        let query = match &email.target {
            RecipientTarget::AllActive => constituent::active(),
            RecipientTarget::Ids(ids) => constituent::by_ids(ids),
        };
        query.load::<Constituent>(&mut conn).await?
    };

    tracing::debug!(recipients = constituents.len(), "Resolved email recipients");

    mailer.send(email.messages_for(constituents)).await
}
