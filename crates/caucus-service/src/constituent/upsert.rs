use chrono::{DateTime, Utc};
use diesel_async::scoped_futures::ScopedFutureExt;

use caucus_db::db::connection::DbConnection;
use caucus_db::db::query::constituent;
use caucus_db::db::transaction::with_transaction;
use caucus_db::model::constituent::Constituent;

use super::input::ValidConstituent;
use crate::error::{ServiceError, ServiceResult};

/// Whether an upsert inserted a new row or merged into an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(Constituent),
    Updated(Constituent),
}

impl UpsertOutcome {
    #[must_use]
    pub fn constituent(&self) -> &Constituent {
        match self {
            Self::Created(constituent) | Self::Updated(constituent) => constituent,
        }
    }

    #[must_use]
    pub const fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// ## Summary
/// Inserts a constituent, or merges into the row that already owns the email.
///
/// ## Side Effects
/// Runs in its own transaction and holds a row lock on the matching email
/// until it commits.
///
/// ## Errors
/// Returns a database error if any statement fails; nothing is written.
#[tracing::instrument(skip(conn, input), fields(email = %input.email))]
pub async fn upsert_constituent(
    conn: &mut DbConnection<'_>,
    input: &ValidConstituent,
) -> ServiceResult<UpsertOutcome> {
    let input = input.clone();
    let outcome = with_transaction(conn, |tx| {
        async move { upsert_in_transaction(tx, &input, None).await }.scope_boxed()
    })
    .await?;

    let constituent = outcome.constituent();
    if outcome.is_created() {
        tracing::info!(id = constituent.id, "Constituent created");
    } else {
        tracing::info!(id = constituent.id, "Constituent merged by email");
    }

    Ok(outcome)
}

/// ## Summary
/// Upsert body for callers that already hold a transaction.
///
/// New rows get `sign_up_time` when supplied, else the column default. Merged
/// rows keep their stored sign-up time.
///
/// ## Errors
/// Returns a database error if any statement fails.
pub async fn upsert_in_transaction(
    tx: &mut DbConnection<'_>,
    input: &ValidConstituent,
    sign_up_time: Option<DateTime<Utc>>,
) -> ServiceResult<UpsertOutcome> {
    if let Some(existing) = constituent::lock_by_email(tx, &input.email).await? {
        return merge(tx, existing.id, input).await;
    }

    if let Some(created) = constituent::insert_if_absent(tx, &input.to_new(sign_up_time)).await? {
        return Ok(UpsertOutcome::Created(created));
    }

    // A concurrent insert won the email; merge into its row instead.
    tracing::debug!("Email inserted concurrently, falling back to merge");
    let existing = constituent::lock_by_email(tx, &input.email)
        .await?
        .ok_or(ServiceError::InvariantViolation(
            "conflicting constituent row disappeared during upsert",
        ))?;
    merge(tx, existing.id, input).await
}

async fn merge(
    tx: &mut DbConnection<'_>,
    id: i32,
    input: &ValidConstituent,
) -> ServiceResult<UpsertOutcome> {
    let changes = input.to_merge(Utc::now());
    let updated = constituent::update_by_id(tx, id, &changes)
        .await?
        .ok_or(ServiceError::InvariantViolation(
            "locked constituent row missing on update",
        ))?;
    Ok(UpsertOutcome::Updated(updated))
}
