use std::io::Write;

use chrono::{DateTime, Days, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use caucus_core::constants::EXPORT_COLUMNS;
use caucus_db::db::connection::DbConnection;
use caucus_db::db::query::constituent;
use caucus_db::model::constituent::Constituent;
use diesel_async::RunQueryDsl;

use crate::error::{ServiceError, ServiceResult};

/// Sign-up time window for an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Set when `to` was a plain date: the bound is the following midnight.
    pub to_exclusive: bool,
    from_label: String,
    to_label: String,
}

enum Bound {
    Start,
    End,
}

fn invalid_date() -> ServiceError {
    ServiceError::InvalidInput("Invalid date format".to_owned())
}

/// Parses `YYYY-MM-DD` or RFC 3339. Returns the instant and whether it is an
/// exclusive upper bound.
fn parse_bound(raw: &str, bound: &Bound) -> ServiceResult<(DateTime<Utc>, bool)> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return match bound {
            Bound::Start => Ok((date.and_time(chrono::NaiveTime::MIN).and_utc(), false)),
            Bound::End => {
                let next = date.checked_add_days(Days::new(1)).ok_or_else(invalid_date)?;
                Ok((next.and_time(chrono::NaiveTime::MIN).and_utc(), true))
            }
        };
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|instant| (instant.with_timezone(&Utc), false))
        .map_err(|_parse| invalid_date())
}

fn label(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

impl ExportRange {
    /// ## Summary
    /// Builds a range from optional `from`/`to` query values.
    ///
    /// Returns `None` when neither bound is given.
    ///
    /// ## Errors
    /// Returns `InvalidInput` when only one bound is given, a bound does not
    /// parse, or `from` is after `to`.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> ServiceResult<Option<Self>> {
        let from = from.map(str::trim).filter(|value| !value.is_empty());
        let to = to.map(str::trim).filter(|value| !value.is_empty());

        let (raw_from, raw_to) = match (from, to) {
            (None, None) => return Ok(None),
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(ServiceError::InvalidInput(
                    "Both `from` and `to` are required for a date range".to_owned(),
                ));
            }
        };

        let (from, _) = parse_bound(raw_from, &Bound::Start)?;
        let (to, to_exclusive) = parse_bound(raw_to, &Bound::End)?;

        let in_order = if to_exclusive { from < to } else { from <= to };
        if !in_order {
            return Err(ServiceError::InvalidInput(
                "`from` must not be after `to`".to_owned(),
            ));
        }

        Ok(Some(Self {
            from,
            to,
            to_exclusive,
            from_label: label(raw_from),
            to_label: label(raw_to),
        }))
    }
}

/// Attachment filename for an export over `range`.
#[must_use]
pub fn export_filename(range: Option<&ExportRange>) -> String {
    match range {
        Some(range) => format!(
            "constituents_{}_to_{}.csv",
            range.from_label, range.to_label
        ),
        None => "constituents.csv".to_owned(),
    }
}

#[derive(Serialize)]
struct ExportRow<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: Option<&'a str>,
    sign_up_time: String,
}

impl<'a> From<&'a Constituent> for ExportRow<'a> {
    fn from(constituent: &'a Constituent) -> Self {
        Self {
            first_name: &constituent.first_name,
            last_name: &constituent.last_name,
            email: &constituent.email,
            phone: constituent.phone.as_deref(),
            sign_up_time: constituent
                .sign_up_time
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// ## Summary
/// Writes constituents as CSV with the export header, even when empty.
///
/// ## Errors
/// Returns `ExportError` if writing fails.
pub fn write_csv<W: Write>(constituents: &[Constituent], writer: W) -> ServiceResult<()> {
    let export_error = |e: csv::Error| ServiceError::ExportError(e.to_string());

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(EXPORT_COLUMNS).map_err(export_error)?;
    for constituent in constituents {
        csv_writer
            .serialize(ExportRow::from(constituent))
            .map_err(export_error)?;
    }
    csv_writer
        .flush()
        .map_err(|e| ServiceError::ExportError(e.to_string()))?;

    Ok(())
}

/// ## Summary
/// Renders constituents signed up within `range` (or all of them) as CSV.
///
/// ## Errors
/// Returns a database error if the query fails, or `ExportError` if encoding
/// fails.
#[tracing::instrument(skip(conn))]
pub async fn export_constituents(
    conn: &mut DbConnection<'_>,
    range: Option<&ExportRange>,
) -> ServiceResult<Vec<u8>> {
    let query = match range {
        Some(range) => constituent::signed_up_between(range.from, range.to, range.to_exclusive),
        None => constituent::by_sign_up_time(),
    };
    let constituents = query.load::<Constituent>(conn).await?;

    let mut buffer = Vec::new();
    write_csv(&constituents, &mut buffer)?;

    tracing::debug!(rows = constituents.len(), "Exported constituents");

    Ok(buffer)
}
