//! Query functions for issues.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::db::connection::DbConnection;
use crate::db::schema::{constituent_issues, issues};
use crate::db::transaction::with_transaction;
use crate::model::constituent_issue::{ConstituentIssue, NewConstituentIssue};
use crate::model::issue::{Issue, NewIssue};

/// ## Summary
/// Loads the `limit` most mentioned issues, highest count first, ties by ID.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn most_mentioned(
    conn: &mut DbConnection<'_>,
    limit: i64,
) -> diesel::QueryResult<Vec<Issue>> {
    issues::table
        .select(Issue::as_select())
        .order((issues::count.desc(), issues::id.asc()))
        .limit(limit)
        .load::<Issue>(conn)
        .await
}

/// ## Summary
/// Inserts a new issue and returns the inserted record.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_issue(
    conn: &mut DbConnection<'_>,
    new_issue: &NewIssue<'_>,
) -> diesel::QueryResult<Issue> {
    diesel::insert_into(issues::table)
        .values(new_issue)
        .returning(Issue::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Links a constituent to an issue and bumps the issue's mention count.
///
/// Both writes commit together.
///
/// ## Errors
/// Returns a database error if either write fails; nothing is committed.
pub async fn record_mention(
    conn: &mut DbConnection<'_>,
    mention: &NewConstituentIssue,
) -> diesel::QueryResult<ConstituentIssue> {
    let mention = mention.clone();
    with_transaction(conn, |tx| {
        async move {
            let link = diesel::insert_into(constituent_issues::table)
                .values(&mention)
                .returning(ConstituentIssue::as_returning())
                .get_result(tx)
                .await?;

            if let Some(issue_id) = mention.issue_id {
                diesel::update(issues::table.find(issue_id))
                    .set(issues::count.eq(issues::count + 1))
                    .execute(tx)
                    .await?;
            }

            Ok(link)
        }
        .scope_boxed()
    })
    .await
}
