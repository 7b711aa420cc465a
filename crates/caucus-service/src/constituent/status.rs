use chrono::Utc;

use caucus_db::db::connection::DbConnection;
use caucus_db::db::query::constituent;
use caucus_db::model::constituent::{Constituent, ConstituentChanges};

use crate::error::{ServiceError, ServiceResult};

/// ## Summary
/// Sets the status marker of a constituent. A non-zero status is a soft delete.
///
/// ## Errors
/// Returns `NotFound` when no constituent has the ID, or a database error if
/// the update fails.
#[tracing::instrument(skip(conn))]
pub async fn update_status(
    conn: &mut DbConnection<'_>,
    id: i32,
    status: i32,
) -> ServiceResult<Constituent> {
    let changes = ConstituentChanges {
        active: Some(status),
        updated_time: Some(Utc::now()),
        ..ConstituentChanges::default()
    };

    let updated = constituent::update_by_id(conn, id, &changes)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Constituent not found".to_owned()))?;

    tracing::info!(id, status, "Constituent status updated");

    Ok(updated)
}
