use salvo::{Depot, Response, Router, handler, writing::Json};

use crate::error::AppResult;
use crate::shared;
use caucus_core::constants::TOP_ISSUES_ROUTE_COMPONENT;
use caucus_service::dashboard::{TopIssue, top_issues};

async fn load(depot: &Depot) -> AppResult<Vec<TopIssue>> {
    let provider = shared::db(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(top_issues(&mut conn).await?)
}

/// ## Summary
/// GET /top-issues - The most mentioned issues with their share of mentions.
///
/// ## Errors
/// Returns HTTP 500 if the query fails.
#[handler]
async fn list_top_issues(depot: &mut Depot, res: &mut Response) {
    match load(depot).await {
        Ok(issues) => res.render(Json(issues)),
        Err(e) => res.render(e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(TOP_ISSUES_ROUTE_COMPONENT).get(list_top_issues)
}
