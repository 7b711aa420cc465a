use salvo::{Depot, Request, Response, Router, handler, writing::Json};

use crate::error::AppResult;
use crate::shared;
use caucus_core::constants::{DASHBOARD_ROUTE_COMPONENT, DASHBOARD_SUMMARY_ROUTE_COMPONENT};
use caucus_service::dashboard::{DashboardSummary, dashboard_summary};

use super::constituents::list_params;

async fn summarize(req: &mut Request, depot: &Depot) -> AppResult<DashboardSummary> {
    let params = list_params(req)?;
    let provider = shared::db(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(dashboard_summary(&mut conn, params).await?)
}

/// ## Summary
/// GET /dashboard/summary - Sign-ups by month and top area codes over the
/// constituents selected by the listing parameters.
///
/// ## Errors
/// Returns HTTP 400 for malformed parameters.
/// Returns HTTP 500 if the query fails.
#[handler]
async fn summary(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match summarize(req, depot).await {
        Ok(report) => res.render(Json(report)),
        Err(e) => res.render(e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(DASHBOARD_ROUTE_COMPONENT)
        .push(Router::with_path(DASHBOARD_SUMMARY_ROUTE_COMPONENT).get(summary))
}
