use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use diesel_async::scoped_futures::ScopedFutureExt;
use serde::Serialize;

use caucus_core::constants::IMPORT_REQUIRED_COLUMNS;
use caucus_db::db::connection::DbConnection;
use caucus_db::db::transaction::with_transaction;

use crate::constituent::{ConstituentInput, UpsertOutcome, ValidConstituent, upsert_in_transaction};
use crate::error::{ServiceError, ServiceResult};
use crate::validation::Violations;

/// Outcome of a committed import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}

/// Positions of the required columns within the uploaded header.
struct ColumnIndex {
    first_name: usize,
    last_name: usize,
    email: usize,
    phone: usize,
}

impl ColumnIndex {
    fn locate(headers: &StringRecord) -> ServiceResult<Self> {
        let position = |name: &str| headers.iter().position(|header| header == name);

        let missing: Vec<&str> = IMPORT_REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| position(name).is_none())
            .collect();

        match IMPORT_REQUIRED_COLUMNS.map(position) {
            [Some(first_name), Some(last_name), Some(email), Some(phone)] => Ok(Self {
                first_name,
                last_name,
                email,
                phone,
            }),
            _ => Err(ServiceError::InvalidInput(format!(
                "CSV is missing required columns: {}",
                missing.join(", ")
            ))),
        }
    }

    fn input(&self, record: &StringRecord) -> ConstituentInput {
        let field = |index: usize| record.get(index).map(str::to_owned);
        ConstituentInput {
            first_name: field(self.first_name),
            last_name: field(self.last_name),
            email: field(self.email),
            phone: field(self.phone),
            ..ConstituentInput::default()
        }
    }
}

/// ## Summary
/// Parses and validates an uploaded CSV without touching the store.
///
/// Headers are matched by name after trimming; extra columns are ignored and
/// blank lines are skipped. Rows are numbered from 1, excluding the header.
///
/// ## Errors
/// Returns `InvalidInput` for missing required columns, `CsvError` for
/// malformed CSV (including ragged rows), or `Validation` listing every row
/// violation.
pub fn parse_import<R: Read>(reader: R) -> ServiceResult<Vec<ValidConstituent>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let columns = ColumnIndex::locate(&headers)?;

    let mut rows = Vec::new();
    let mut violations = Violations::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        match columns.input(&record).validate() {
            Ok(valid) => rows.push(valid),
            Err(row_violations) => violations.extend_for_row(index + 1, row_violations),
        }
    }

    if violations.is_empty() {
        Ok(rows)
    } else {
        Err(ServiceError::Validation(violations))
    }
}

/// ## Summary
/// Writes validated rows, merging by email, in a single transaction.
///
/// ## Side Effects
/// New rows are stamped with `imported_at`; merged rows keep their sign-up time.
///
/// ## Errors
/// Returns a database error if any write fails; nothing is committed.
#[tracing::instrument(skip(conn, rows), fields(rows = rows.len()))]
pub async fn import_constituents(
    conn: &mut DbConnection<'_>,
    rows: &[ValidConstituent],
    imported_at: DateTime<Utc>,
) -> ServiceResult<ImportSummary> {
    let rows = rows.to_vec();
    let summary = with_transaction(conn, |tx| {
        async move {
            let mut summary = ImportSummary::default();
            for row in &rows {
                match upsert_in_transaction(tx, row, Some(imported_at)).await? {
                    UpsertOutcome::Created(_) => summary.created += 1,
                    UpsertOutcome::Updated(_) => summary.updated += 1,
                }
            }
            Ok::<_, ServiceError>(summary)
        }
        .scope_boxed()
    })
    .await?;

    tracing::info!(
        created = summary.created,
        updated = summary.updated,
        "CSV import committed"
    );

    Ok(summary)
}

/// ## Summary
/// Reads, validates and imports a CSV file from disk.
///
/// ## Errors
/// Returns `IoError` if the file cannot be read, plus any error from
/// [`parse_import`] or [`import_constituents`].
pub async fn import_csv_file(
    conn: &mut DbConnection<'_>,
    path: &Path,
    imported_at: DateTime<Utc>,
) -> ServiceResult<ImportSummary> {
    let bytes = tokio::fs::read(path).await?;
    let rows = parse_import(bytes.as_slice())?;

    tracing::debug!(rows = rows.len(), "CSV validated");

    import_constituents(conn, &rows, imported_at).await
}
