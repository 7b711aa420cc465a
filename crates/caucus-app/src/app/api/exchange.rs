use chrono::Utc;
use salvo::http::HeaderValue;
use salvo::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use salvo::{Depot, Request, Response, Router, handler, writing::Json};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::BearerAuthMiddleware;
use crate::shared;
use crate::upload::receive_upload;
use caucus_core::constants::{
    DOWNLOAD_ROUTE_COMPONENT, EXPORT_ROUTE_COMPONENT, UPLOAD_FILE_FIELD, UPLOAD_ROUTE_COMPONENT,
};
use caucus_core::error::CoreError;
use caucus_service::exchange::{
    ExportRange, ImportSummary, export_constituents, export_filename, import_csv_file,
};

/// ## Summary
/// CSV import result payload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

struct CsvExport {
    filename: String,
    body: Vec<u8>,
}

async fn export_inner(req: &mut Request, depot: &Depot) -> AppResult<CsvExport> {
    let from = req.query::<String>("from");
    let to = req.query::<String>("to");
    let range = ExportRange::parse(from.as_deref(), to.as_deref())?;

    let provider = shared::db(depot)?;
    let mut conn = provider.get_connection().await?;
    let body = export_constituents(&mut conn, range.as_ref()).await?;

    Ok(CsvExport {
        filename: export_filename(range.as_ref()),
        body,
    })
}

fn write_export(res: &mut Response, export: CsvExport) -> AppResult<()> {
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        export.filename
    ))
    .map_err(|_err| CoreError::InvariantViolation("export filename is not a valid header"))?;

    let headers = res.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(CONTENT_DISPOSITION, disposition);
    res.body(export.body);
    Ok(())
}

/// ## Summary
/// GET /constituents/download and /constituents/export - CSV of constituents,
/// optionally limited to a sign-up window with `from` and `to`.
///
/// ## Errors
/// Returns HTTP 400 for a half-open or unparseable range.
/// Returns HTTP 500 if the query fails.
#[handler]
async fn download(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let result = match export_inner(req, depot).await {
        Ok(export) => write_export(res, export),
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        res.render(e);
    }
}

async fn upload_inner(req: &mut Request, depot: &Depot) -> AppResult<ImportSummary> {
    let config = shared::settings(depot)?;
    let received = receive_upload(req, &config.upload, UPLOAD_FILE_FIELD).await?;

    let provider = shared::db(depot)?;
    let mut conn = provider.get_connection().await?;
    tracing::debug!(size = received.size(), "Importing uploaded CSV");
    let summary = import_csv_file(&mut conn, received.path(), Utc::now()).await?;

    Ok(summary)
}

/// ## Summary
/// POST /constituents/upload - Import a CSV, merging rows by email.
///
/// ## Side Effects
/// The upload is held in a temporary file under `upload.dir` that is removed
/// when the request finishes.
///
/// ## Errors
/// Returns HTTP 400 for missing columns, malformed CSV or invalid rows; HTTP
/// 413 for oversized files. Nothing is written on any error.
#[handler]
async fn upload(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match upload_inner(req, depot).await {
        Ok(summary) => res.render(Json(UploadResponse {
            message: "CSV uploaded and processed successfully",
            summary,
        })),
        Err(e) => res.render(e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::new()
        .push(Router::with_path(DOWNLOAD_ROUTE_COMPONENT).get(download))
        .push(Router::with_path(EXPORT_ROUTE_COMPONENT).get(download))
        .push(
            Router::with_path(UPLOAD_ROUTE_COMPONENT)
                .hoop(BearerAuthMiddleware)
                .post(upload),
        )
}
