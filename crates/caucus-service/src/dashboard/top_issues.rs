use serde::Serialize;

use caucus_core::constants::TOP_ISSUES_COUNT;
use caucus_db::db::connection::DbConnection;
use caucus_db::db::query::issue;
use caucus_db::model::issue::Issue;

use crate::error::ServiceResult;

/// Direction an issue is moving in. No history is tracked yet, so every
/// issue reports `Stable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopIssue {
    pub id: i32,
    pub name: String,
    pub count: i32,
    pub trend: Trend,
    /// Share of the combined count of the ranked issues, rounded half up.
    pub percentage: i64,
}

fn percentage(count: i64, total: i64) -> i64 {
    if total <= 0 || count <= 0 {
        return 0;
    }
    (count * 200 + total) / (total * 2)
}

/// Annotates already ranked issues with their share of the combined count.
#[must_use]
pub fn rank_top_issues(issues: Vec<Issue>) -> Vec<TopIssue> {
    let total: i64 = issues
        .iter()
        .map(|issue| i64::from(issue.count.max(0)))
        .sum();

    issues
        .into_iter()
        .map(|issue| TopIssue {
            percentage: percentage(i64::from(issue.count), total),
            id: issue.id,
            name: issue.name,
            count: issue.count,
            trend: Trend::Stable,
        })
        .collect()
}

/// ## Summary
/// Returns the most mentioned issues, count descending.
///
/// ## Errors
/// Returns a database error if the query fails.
#[tracing::instrument(skip(conn))]
pub async fn top_issues(conn: &mut DbConnection<'_>) -> ServiceResult<Vec<TopIssue>> {
    let issues = issue::most_mentioned(conn, TOP_ISSUES_COUNT).await?;
    tracing::debug!(count = issues.len(), "Loaded top issues");
    Ok(rank_top_issues(issues))
}
