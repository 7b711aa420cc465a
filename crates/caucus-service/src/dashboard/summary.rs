use std::collections::HashMap;

use chrono::Datelike;
use serde::Serialize;

use caucus_core::constants::TOP_AREA_CODES_COUNT;
use caucus_db::db::connection::DbConnection;
use caucus_db::db::query::constituent;
use caucus_db::model::constituent::Constituent;

use crate::constituent::ListParams;
use crate::error::ServiceResult;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    pub month: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaCodeCount {
    pub area_code: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total: usize,
    pub sign_ups_by_month: Vec<MonthCount>,
    pub top_area_codes: Vec<AreaCodeCount>,
}

/// Area code of a North American style number.
///
/// Non-digits are stripped; at least ten digits are required. A leading
/// country code `1` is skipped.
#[must_use]
pub fn extract_area_code(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 {
        return None;
    }
    let code = if digits.starts_with('1') {
        digits.get(1..4)
    } else {
        digits.get(0..3)
    };
    code.map(str::to_owned)
}

/// Sign-up counts for each calendar month (UTC), January first, across all years.
#[must_use]
pub fn sign_ups_by_month(constituents: &[Constituent]) -> Vec<MonthCount> {
    let mut counts = [0_usize; 12];
    for constituent in constituents {
        let month = constituent.sign_up_time.month0();
        if let Some(slot) = usize::try_from(month)
            .ok()
            .and_then(|index| counts.get_mut(index))
        {
            *slot += 1;
        }
    }

    MONTH_LABELS
        .into_iter()
        .zip(counts)
        .map(|(month, count)| MonthCount { month, count })
        .collect()
}

/// The `limit` most common area codes, count descending then code ascending.
#[must_use]
pub fn top_area_codes(constituents: &[Constituent], limit: usize) -> Vec<AreaCodeCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for area_code in constituents
        .iter()
        .filter_map(|constituent| constituent.phone.as_deref())
        .filter_map(extract_area_code)
    {
        *counts.entry(area_code).or_default() += 1;
    }

    let mut ranked: Vec<AreaCodeCount> = counts
        .into_iter()
        .map(|(area_code, count)| AreaCodeCount { area_code, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.area_code.cmp(&b.area_code)));
    ranked.truncate(limit);
    ranked
}

impl DashboardSummary {
    #[must_use]
    pub fn from_constituents(constituents: &[Constituent]) -> Self {
        Self {
            total: constituents.len(),
            sign_ups_by_month: sign_ups_by_month(constituents),
            top_area_codes: top_area_codes(constituents, TOP_AREA_CODES_COUNT),
        }
    }
}

/// ## Summary
/// Aggregates the constituents selected by the listing parameters.
///
/// ## Errors
/// Returns `InvalidInput` for malformed parameters, or a database error if
/// the query fails.
#[tracing::instrument(skip(conn))]
pub async fn dashboard_summary(
    conn: &mut DbConnection<'_>,
    params: ListParams,
) -> ServiceResult<DashboardSummary> {
    let criteria = params.into_criteria()?;
    let constituents = constituent::list(conn, criteria).await?;

    tracing::debug!(total = constituents.len(), "Aggregating dashboard summary");

    Ok(DashboardSummary::from_constituents(&constituents))
}
