//! Scoped storage for uploaded files.

use std::path::Path;

use salvo::Request;
use salvo::http::header::CONTENT_LENGTH;
use tempfile::NamedTempFile;

use caucus_core::config::UploadConfig;
use caucus_service::error::ServiceError;

use crate::error::{AppError, AppResult};

/// Room left for multipart boundaries and part headers when checking the
/// declared request length against the file limit.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// An uploaded file persisted under `upload.dir`. The file is removed when
/// this guard drops.
#[derive(Debug)]
pub struct ScopedUpload {
    file: NamedTempFile,
    size: u64,
}

impl ScopedUpload {
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }
}

fn declared_length(req: &Request) -> Option<u64> {
    req.headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok())
}

/// ## Summary
/// Moves the multipart field `field` into a scoped temporary file.
///
/// Salvo spools file parts to disk without a size cap, so the declared
/// `Content-Length` is the only bound checked before the body is read.
/// Chunked requests without one are refused.
///
/// ## Errors
/// Returns `LengthRequired` when no `Content-Length` is declared,
/// `PayloadTooLarge` when the request or file exceeds `upload.max_bytes`,
/// `BadRequest` when the field is missing, or an I/O error if the file cannot
/// be written.
#[tracing::instrument(skip(req, config), fields(dir = %config.dir.display()))]
pub async fn receive_upload(
    req: &mut Request,
    config: &UploadConfig,
    field: &str,
) -> AppResult<ScopedUpload> {
    let limit = config.max_bytes;

    let Some(length) = declared_length(req) else {
        tracing::warn!("Upload rejected without a declared length");
        return Err(AppError::LengthRequired);
    };
    if length > limit.saturating_add(MULTIPART_OVERHEAD) {
        tracing::warn!(length, limit, "Upload rejected by declared length");
        return Err(AppError::PayloadTooLarge { limit });
    }

    let part = req
        .file(field)
        .await
        .ok_or_else(|| AppError::BadRequest("No file uploaded".to_owned()))?;

    let size = part.size();
    if size > limit {
        tracing::warn!(size, limit, "Upload rejected by size");
        return Err(AppError::PayloadTooLarge { limit });
    }

    tokio::fs::create_dir_all(&config.dir)
        .await
        .map_err(ServiceError::from)?;
    let file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(".csv")
        .tempfile_in(&config.dir)
        .map_err(ServiceError::from)?;
    tokio::fs::copy(part.path(), file.path())
        .await
        .map_err(ServiceError::from)?;

    tracing::debug!(size, path = %file.path().display(), "Upload stored");

    Ok(ScopedUpload { file, size })
}
