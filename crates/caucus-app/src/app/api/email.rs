use salvo::{Depot, Request, Response, Router, handler, writing::Json};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{BearerAuthMiddleware, get_subject_from_depot};
use crate::shared;
use caucus_core::constants::SEND_EMAIL_ROUTE_COMPONENT;
use caucus_service::error::ServiceError;
use caucus_service::mail::{BulkEmailInput, send_bulk_email};

/// ## Summary
/// Bulk email result payload
#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub message: &'static str,
    pub queued: usize,
}

async fn send_inner(req: &mut Request, depot: &Depot) -> AppResult<usize> {
    let input: BulkEmailInput = req.parse_json().await.map_err(|e| {
        tracing::debug!(error = %e, "Failed to parse email request");
        AppError::BadRequest("Invalid request body".to_owned())
    })?;
    let email = input.validate().map_err(ServiceError::from)?;

    let provider = shared::db(depot)?;
    let mailer = shared::mailer(depot)?;

    if let Some(subject) = get_subject_from_depot(depot) {
        tracing::info!(sender = %subject.subject, "Sending bulk email");
    }

    Ok(send_bulk_email(provider.as_ref(), mailer.as_ref(), &email).await?)
}

/// ## Summary
/// POST /send-email - Queue one email per selected constituent.
///
/// ## Errors
/// Returns HTTP 400 for missing recipients, subject or body.
/// Returns HTTP 500 if the messages cannot be queued.
#[handler]
async fn send_email(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match send_inner(req, depot).await {
        Ok(queued) => res.render(Json(SendEmailResponse {
            message: "Email queued successfully",
            queued,
        })),
        Err(e) => res.render(e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(SEND_EMAIL_ROUTE_COMPONENT)
        .hoop(BearerAuthMiddleware)
        .post(send_email)
}
