use salvo::http::header::AUTHORIZATION;
use salvo::{Depot, Scribe};

use crate::error::AppError;
use crate::shared;
use caucus_service::auth::{AuthenticatedSubject, parse_bearer};
use caucus_service::error::ServiceError;

pub mod depot_keys {
    pub const AUTHENTICATED_SUBJECT: &str = "__authenticated_subject";
}

/// ## Summary
/// Requires a valid bearer token and stores the authenticated subject in the
/// depot under [`depot_keys::AUTHENTICATED_SUBJECT`].
///
/// ## Errors
/// Responds 401 `Unauthorized` for a missing, unknown or expired token, and
/// 500 when the token store cannot be reached.
pub struct BearerAuthMiddleware;

#[salvo::async_trait]
impl salvo::Handler for BearerAuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        tracing::trace!("Checking bearer token");

        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer)
            .map(str::to_owned);

        let Some(token) = token else {
            tracing::debug!("Missing bearer token");
            AppError::Unauthorized("Unauthorized").render(res);
            ctrl.skip_rest();
            return;
        };

        let authenticator = match shared::authenticator(depot) {
            Ok(authenticator) => authenticator,
            Err(e) => {
                e.render(res);
                ctrl.skip_rest();
                return;
            }
        };

        match authenticator.verify_bearer(&token).await {
            Ok(subject) => {
                tracing::debug!(subject = %subject.subject, "Bearer token accepted");
                depot.insert(depot_keys::AUTHENTICATED_SUBJECT, subject);
            }
            Err(ServiceError::NotAuthenticated) => {
                tracing::debug!("Bearer token rejected");
                AppError::Unauthorized("Unauthorized").render(res);
                ctrl.skip_rest();
            }
            Err(e) => {
                tracing::error!(error = %e, "Bearer token check failed");
                AppError::from(e).render(res);
                ctrl.skip_rest();
            }
        }
    }
}

/// Subject stored by [`BearerAuthMiddleware`], if the request passed it.
#[must_use]
pub fn get_subject_from_depot(depot: &Depot) -> Option<&AuthenticatedSubject> {
    depot
        .get::<AuthenticatedSubject>(depot_keys::AUTHENTICATED_SUBJECT)
        .ok()
}
