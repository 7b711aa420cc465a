mod constituents;
mod dashboard;
mod email;
mod exchange;
mod healthcheck;
mod issues;
mod login;

use salvo::Router;

// Re-export route constants from core
pub use caucus_core::constants::{
    CONSTITUENTS_ROUTE_PREFIX, DASHBOARD_SUMMARY_ROUTE_PREFIX, DOWNLOAD_ROUTE_PREFIX,
    EXPORT_ROUTE_PREFIX, HEALTHCHECK_ROUTE_PREFIX, LOGIN_ROUTE_PREFIX, SEND_EMAIL_ROUTE_PREFIX,
    TOP_ISSUES_ROUTE_PREFIX, UPLOAD_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the API router. Upload and bulk email sit behind
/// `BearerAuthMiddleware`; every other route is open.
#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(healthcheck::routes())
        .push(login::routes())
        .push(constituents::routes())
        .push(issues::routes())
        .push(dashboard::routes())
        .push(email::routes())
}
