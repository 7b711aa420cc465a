//! Shared services handed to every request through the depot.
//!
//! Each service is injected under its own type, so handlers fetch them with
//! the typed getters below instead of depot string keys.

use std::sync::Arc;

use salvo::{Depot, FlowCtrl, Handler, Request, Response, Router, async_trait};

use crate::error::AppResult;
use caucus_core::config::Settings;
use caucus_core::error::CoreError;
use caucus_db::db::DbProvider;
use caucus_service::auth::Authenticator;
use caucus_service::mail::Mailer;

/// Injects a clone of the wrapped value into the depot for every request.
pub struct Provide<T>(pub T);

#[async_trait]
impl<T> Handler for Provide<T>
where
    T: Clone + Send + Sync + 'static,
{
    #[tracing::instrument(skip_all, fields(service = std::any::type_name::<T>()))]
    async fn handle(
        &self,
        _req: &mut Request,
        depot: &mut Depot,
        _res: &mut Response,
        _ctrl: &mut FlowCtrl,
    ) {
        depot.inject(self.0.clone());
    }
}

/// Everything the routes need, built once in `main`.
#[derive(Clone)]
pub struct SharedServices {
    pub settings: Arc<Settings>,
    pub db: Arc<dyn DbProvider>,
    pub authenticator: Arc<dyn Authenticator>,
    pub mailer: Arc<dyn Mailer>,
}

impl SharedServices {
    /// ## Summary
    /// Adds one injecting hoop per service to `router`.
    #[must_use]
    pub fn install(self, router: Router) -> Router {
        router
            .hoop(Provide(self.db))
            .hoop(Provide(self.settings))
            .hoop(Provide(self.authenticator))
            .hoop(Provide(self.mailer))
    }
}

fn obtain<T>(depot: &Depot, missing: &'static str) -> AppResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    depot
        .obtain::<T>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation(missing).into())
}

/// ## Summary
/// Retrieves the application configuration from the depot.
///
/// ## Errors
/// Returns an invariant violation if `SharedServices` was not installed.
pub fn settings(depot: &Depot) -> AppResult<Arc<Settings>> {
    obtain(depot, "Configuration not found in depot")
}

/// ## Summary
/// Retrieves the database provider from the depot.
///
/// ## Errors
/// Returns an invariant violation if `SharedServices` was not installed.
pub fn db(depot: &Depot) -> AppResult<Arc<dyn DbProvider>> {
    obtain(depot, "Database provider not found in depot")
}

/// ## Errors
/// Returns an invariant violation if `SharedServices` was not installed.
pub fn authenticator(depot: &Depot) -> AppResult<Arc<dyn Authenticator>> {
    obtain(depot, "Authenticator not found in depot")
}

/// ## Errors
/// Returns an invariant violation if `SharedServices` was not installed.
pub fn mailer(depot: &Depot) -> AppResult<Arc<dyn Mailer>> {
    obtain(depot, "Mailer not found in depot")
}
