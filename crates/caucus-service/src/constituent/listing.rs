use serde::Deserialize;

use caucus_core::constants::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use caucus_db::db::connection::DbConnection;
use caucus_db::db::query::constituent::{
    self as constituent_query, ColumnFilter, ConstituentColumn, ListCriteria, SortDirection,
};
use caucus_db::model::constituent::Constituent;

use crate::error::{ServiceError, ServiceResult};

/// Raw listing parameters as received in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort: Option<String>,
    pub filter: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    /// ## Summary
    /// Parses the raw parameters into typed listing criteria.
    ///
    /// ## Errors
    /// Returns `InvalidInput` for an unknown sort or filter field, a bad sort
    /// direction, a filter without `:`, a non-integer `id`/`active` filter, or
    /// a `page`/`limit` that is not a positive integer within bounds.
    pub fn into_criteria(self) -> ServiceResult<ListCriteria> {
        let search = self
            .search
            .map(|term| term.trim().to_owned())
            .filter(|term| !term.is_empty());

        let sort = self.sort.as_deref().map(parse_sort).transpose()?;
        let filter = self.filter.as_deref().map(parse_filter).transpose()?;

        let page = self
            .page
            .as_deref()
            .map(|raw| parse_positive("page", raw))
            .transpose()?;
        let limit = self
            .limit
            .as_deref()
            .map(|raw| parse_positive("limit", raw))
            .transpose()?;

        if let Some(limit) = limit
            && limit > MAX_PAGE_LIMIT
        {
            return Err(ServiceError::InvalidInput(format!(
                "Invalid limit: must not exceed {MAX_PAGE_LIMIT}"
            )));
        }

        let (offset, limit) = match (page, limit) {
            (None, None) => (None, None),
            (page, limit) => {
                let page = page.unwrap_or(1);
                let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);
                let offset = (page - 1).checked_mul(limit).ok_or_else(|| {
                    ServiceError::InvalidInput("Invalid page: out of range".to_owned())
                })?;
                (Some(offset), Some(limit))
            }
        };

        Ok(ListCriteria {
            search,
            sort,
            filter,
            offset,
            limit,
        })
    }
}

fn parse_positive(name: &str, raw: &str) -> ServiceResult<i64> {
    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ServiceError::InvalidInput(format!(
            "Invalid {name}: must be a positive integer"
        ))),
    }
}

fn parse_column(raw: &str) -> ServiceResult<ConstituentColumn> {
    ConstituentColumn::from_name(raw)
        .ok_or_else(|| ServiceError::InvalidInput(format!("Unknown field '{}'", raw.trim())))
}

fn parse_sort(raw: &str) -> ServiceResult<(ConstituentColumn, SortDirection)> {
    let (field, direction) = raw.split_once(':').unwrap_or((raw, ""));
    let column = parse_column(field)?;
    let direction = match direction.trim().to_ascii_lowercase().as_str() {
        "" | "asc" => SortDirection::Asc,
        "desc" => SortDirection::Desc,
        other => {
            return Err(ServiceError::InvalidInput(format!(
                "Invalid sort direction '{other}'"
            )));
        }
    };
    Ok((column, direction))
}

fn parse_filter(raw: &str) -> ServiceResult<ColumnFilter> {
    let (field, value) = raw.split_once(':').ok_or_else(|| {
        ServiceError::InvalidInput("Invalid filter: expected field:value".to_owned())
    })?;
    let column = parse_column(field)?;

    let integer = |value: &str| {
        value.trim().parse::<i32>().map_err(|_parse| {
            ServiceError::InvalidInput(format!(
                "Invalid filter value for '{}': expected an integer",
                column.api_name()
            ))
        })
    };

    match column {
        ConstituentColumn::Id => Ok(ColumnFilter::Id(integer(value)?)),
        ConstituentColumn::Active => Ok(ColumnFilter::Active(integer(value)?)),
        _ => ColumnFilter::text(column, value.to_owned()).ok_or_else(|| {
            ServiceError::InvalidInput(format!(
                "Filtering on '{}' is not supported",
                column.api_name()
            ))
        }),
    }
}

/// ## Summary
/// Lists constituents matching the given parameters.
///
/// ## Errors
/// Returns `InvalidInput` for malformed parameters, or a database error if
/// the query fails.
#[tracing::instrument(skip(conn))]
pub async fn list_constituents(
    conn: &mut DbConnection<'_>,
    params: ListParams,
) -> ServiceResult<Vec<Constituent>> {
    let criteria = params.into_criteria()?;
    let constituents = constituent_query::list(conn, criteria).await?;

    tracing::debug!(count = constituents.len(), "Listed constituents");

    Ok(constituents)
}
