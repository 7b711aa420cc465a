use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, Router, handler, writing::Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::shared;
use caucus_core::constants::CONSTITUENTS_ROUTE_COMPONENT;
use caucus_db::model::constituent::Constituent;
use caucus_service::constituent::{
    ConstituentInput, ConstituentPatch, ListParams, UpsertOutcome, edit_constituent,
    list_constituents, parse_constituent_id, update_status, upsert_constituent,
};
use caucus_service::error::ServiceError;

use super::exchange;

/// ## Summary
/// Single constituent mutation payload
#[derive(Debug, Serialize)]
pub struct ConstituentResponse {
    pub message: &'static str,
    pub constituent: Constituent,
}

/// ## Summary
/// Status update request payload
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: i32,
}

pub(super) fn list_params(req: &mut Request) -> AppResult<ListParams> {
    req.parse_queries::<ListParams>().map_err(|e| {
        tracing::debug!(error = %e, "Failed to parse query string");
        AppError::BadRequest("Invalid query parameters".to_owned())
    })
}

fn path_id(req: &Request) -> AppResult<i32> {
    let raw = req.param::<String>("id").unwrap_or_default();
    Ok(parse_constituent_id(&raw)?)
}

async fn json_body<T>(req: &mut Request, message: &str) -> AppResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    req.parse_json::<T>().await.map_err(|e| {
        tracing::debug!(error = %e, "Failed to parse request body");
        AppError::BadRequest(message.to_owned())
    })
}

/// ## Summary
/// GET /constituents - List constituents with optional search, sort, filter and paging.
///
/// ## Errors
/// Returns HTTP 400 for malformed parameters.
/// Returns HTTP 500 if the query fails.
#[handler]
async fn list(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result: AppResult<Vec<Constituent>> = async {
        let params = list_params(req)?;
        let provider = shared::db(depot)?;
        let mut conn = provider.get_connection().await?;
        Ok(list_constituents(&mut conn, params).await?)
    }
    .await;

    match result {
        Ok(constituents) => res.render(Json(constituents)),
        Err(e) => res.render(e),
    }
}

async fn add_inner(req: &mut Request, depot: &Depot) -> AppResult<UpsertOutcome> {
    let input: ConstituentInput = json_body(req, "Invalid request body").await?;
    let valid = input.validate().map_err(ServiceError::from)?;

    let provider = shared::db(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(upsert_constituent(&mut conn, &valid).await?)
}

/// ## Summary
/// POST /constituents - Add a constituent, or merge into the one with the same email.
///
/// ## Errors
/// Returns HTTP 400 with every field violation when validation fails.
/// Returns HTTP 500 if the transaction fails.
#[handler]
async fn add(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match add_inner(req, depot).await {
        Ok(UpsertOutcome::Created(constituent)) => {
            res.status_code(StatusCode::CREATED);
            res.render(Json(ConstituentResponse {
                message: "Constituent added successfully",
                constituent,
            }));
        }
        Ok(UpsertOutcome::Updated(constituent)) => {
            res.render(Json(ConstituentResponse {
                message: "Constituent updated successfully",
                constituent,
            }));
        }
        Err(e) => res.render(e),
    }
}

async fn set_status_inner(req: &mut Request, depot: &Depot) -> AppResult<Constituent> {
    let id = path_id(req)?;
    let body: StatusRequest = json_body(req, "Status must be an integer").await?;

    let provider = shared::db(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(update_status(&mut conn, id, body.status).await?)
}

/// ## Summary
/// PATCH /constituents/{id} - Set the status marker; a non-zero status soft deletes.
///
/// ## Errors
/// Returns HTTP 400 for a bad id or status, HTTP 404 for an unknown id.
#[handler]
async fn set_status(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match set_status_inner(req, depot).await {
        Ok(constituent) => res.render(Json(ConstituentResponse {
            message: "Constituent status updated successfully",
            constituent,
        })),
        Err(e) => res.render(e),
    }
}

async fn edit_inner(req: &mut Request, depot: &Depot) -> AppResult<Constituent> {
    let id = path_id(req)?;
    let patch: ConstituentPatch = json_body(req, "Invalid request body").await?;
    let valid = patch.validate().map_err(ServiceError::from)?;

    let provider = shared::db(depot)?;
    let mut conn = provider.get_connection().await?;
    Ok(edit_constituent(&mut conn, id, &valid).await?)
}

/// ## Summary
/// PUT /constituents/{id} - Edit any subset of a constituent's fields.
///
/// ## Errors
/// Returns HTTP 400 for validation failures, HTTP 404 for an unknown id and
/// HTTP 409 when the new email belongs to someone else.
#[handler]
async fn edit(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match edit_inner(req, depot).await {
        Ok(constituent) => res.render(Json(ConstituentResponse {
            message: "Constituent updated successfully",
            constituent,
        })),
        Err(e) => res.render(e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(CONSTITUENTS_ROUTE_COMPONENT)
        .get(list)
        .post(add)
        .push(exchange::routes())
        .push(Router::with_path("{id}").patch(set_status).put(edit))
}
