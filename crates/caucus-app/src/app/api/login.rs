use chrono::{DateTime, Utc};
use salvo::http::header::AUTHORIZATION;
use salvo::{Depot, Request, Response, Router, handler, writing::Json};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::shared;
use caucus_core::constants::LOGIN_ROUTE_COMPONENT;
use caucus_service::auth::parse_basic;

/// ## Summary
/// Successful login payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

async fn authenticate(header: Option<String>, depot: &Depot) -> AppResult<LoginResponse> {
    let header = header.ok_or(AppError::Unauthorized("Authorization header missing"))?;
    let credentials =
        parse_basic(&header).ok_or(AppError::Unauthorized("Invalid credentials"))?;

    let authenticator = shared::authenticator(depot)?;
    let subject = authenticator
        .verify_credentials(&credentials.username, &credentials.password)
        .await?;
    let issued = authenticator.issue_token(&subject).await?;

    Ok(LoginResponse {
        message: "Login successful",
        token: issued.token,
        expires_at: issued.expires_at,
    })
}

/// ## Summary
/// POST /login - Exchange `Basic` credentials for a bearer token.
///
/// ## Errors
/// Returns HTTP 401 when the header is missing, malformed or wrong.
/// Returns HTTP 500 if the token cannot be stored.
#[handler]
async fn login(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default().to_owned());

    match authenticate(header, depot).await {
        Ok(body) => res.render(Json(body)),
        Err(e) => res.render(e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(LOGIN_ROUTE_COMPONENT).post(login)
}
