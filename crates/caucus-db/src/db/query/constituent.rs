//! Query functions for constituents.
//!
//! Listing predicates are assembled on a boxed query from typed criteria, so
//! every client-supplied value reaches Postgres as a bind parameter.

use chrono::{DateTime, Utc};
use diesel::dsl::{AsSelect, SqlTypeOf};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::constituents;
use crate::model::constituent::{Constituent, ConstituentChanges, NewConstituent};

type BoxedQuery<'a, T> = constituents::BoxedQuery<'a, Pg, SqlTypeOf<AsSelect<T, Pg>>>;

/// Constituent columns that can be sorted or filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstituentColumn {
    Id,
    FirstName,
    LastName,
    Email,
    Phone,
    SignUpTime,
    UpdatedTime,
    Active,
    Address,
    City,
    State,
    ZipCode,
    PreferredContactMethod,
    LastContactDate,
}

impl ConstituentColumn {
    const ALL: [Self; 14] = [
        Self::Id,
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::SignUpTime,
        Self::UpdatedTime,
        Self::Active,
        Self::Address,
        Self::City,
        Self::State,
        Self::ZipCode,
        Self::PreferredContactMethod,
        Self::LastContactDate,
    ];

    /// The field name used in the JSON representation.
    #[must_use]
    pub const fn api_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::SignUpTime => "signUpTime",
            Self::UpdatedTime => "updatedTime",
            Self::Active => "active",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zipCode",
            Self::PreferredContactMethod => "preferredContactMethod",
            Self::LastContactDate => "lastContactDate",
        }
    }

    /// The column name in the database.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::SignUpTime => "sign_up_time",
            Self::UpdatedTime => "updated_time",
            Self::Active => "active",
            Self::Address => "address",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zip_code",
            Self::PreferredContactMethod => "preferred_contact_method",
            Self::LastContactDate => "last_contact_date",
        }
    }

    /// Resolves either the camelCase API name or the snake_case column name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|column| column.api_name() == name || column.column_name() == name)
    }

    /// All columns, in declaration order.
    #[must_use]
    pub const fn all() -> [Self; 14] {
        Self::ALL
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Equality predicate on a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFilter {
    Id(i32),
    Active(i32),
    FirstName(String),
    LastName(String),
    Email(String),
    Phone(String),
    Address(String),
    City(String),
    State(String),
    ZipCode(String),
    PreferredContactMethod(String),
}

impl ColumnFilter {
    /// Builds a string equality filter, or `None` if the column is not text.
    #[must_use]
    pub fn text(column: ConstituentColumn, value: String) -> Option<Self> {
        Some(match column {
            ConstituentColumn::FirstName => Self::FirstName(value),
            ConstituentColumn::LastName => Self::LastName(value),
            ConstituentColumn::Email => Self::Email(value),
            ConstituentColumn::Phone => Self::Phone(value),
            ConstituentColumn::Address => Self::Address(value),
            ConstituentColumn::City => Self::City(value),
            ConstituentColumn::State => Self::State(value),
            ConstituentColumn::ZipCode => Self::ZipCode(value),
            ConstituentColumn::PreferredContactMethod => Self::PreferredContactMethod(value),
            ConstituentColumn::Id
            | ConstituentColumn::SignUpTime
            | ConstituentColumn::UpdatedTime
            | ConstituentColumn::Active
            | ConstituentColumn::LastContactDate => return None,
        })
    }
}

/// Typed listing criteria. All present predicates are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCriteria {
    /// Case-insensitive substring matched against first or last name.
    pub search: Option<String>,
    pub sort: Option<(ConstituentColumn, SortDirection)>,
    pub filter: Option<ColumnFilter>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

/// ## Summary
/// Escapes LIKE metacharacters and wraps the term for a substring match.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// ## Summary
/// Returns a query to select all constituents.
#[must_use]
pub fn all() -> BoxedQuery<'static, Constituent> {
    constituents::table
        .select(Constituent::as_select())
        .into_boxed()
}

/// ## Summary
/// Returns a query to find a constituent by ID.
#[must_use]
pub fn by_id(id: i32) -> BoxedQuery<'static, Constituent> {
    all().filter(constituents::id.eq(id))
}

/// ## Summary
/// Returns a query to find constituents by their IDs.
#[must_use]
pub fn by_ids(ids: &[i32]) -> BoxedQuery<'static, Constituent> {
    all()
        .filter(constituents::id.eq_any(ids.to_vec()))
        .order(constituents::id.asc())
}

/// ## Summary
/// Returns a query to find active (not soft-deleted) constituents.
#[must_use]
pub fn active() -> BoxedQuery<'static, Constituent> {
    all()
        .filter(constituents::active.eq(0))
        .order(constituents::id.asc())
}

/// ## Summary
/// Returns a query for constituents signed up within `[from, to]` or
/// `[from, to)` when `to_exclusive` is set, ordered by sign-up time.
#[must_use]
pub fn signed_up_between(
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    to_exclusive: bool,
) -> BoxedQuery<'static, Constituent> {
    let query = all().filter(constituents::sign_up_time.ge(from));
    let query = if to_exclusive {
        query.filter(constituents::sign_up_time.lt(to))
    } else {
        query.filter(constituents::sign_up_time.le(to))
    };
    query.order((constituents::sign_up_time.asc(), constituents::id.asc()))
}

/// ## Summary
/// Returns a query for every constituent ordered by sign-up time.
#[must_use]
pub fn by_sign_up_time() -> BoxedQuery<'static, Constituent> {
    all().order((constituents::sign_up_time.asc(), constituents::id.asc()))
}

macro_rules! order_by_column {
    ($query:expr, $column:expr, $direction:expr) => {
        match $direction {
            SortDirection::Asc => $query.order($column.asc()),
            SortDirection::Desc => $query.order($column.desc()),
        }
    };
}

fn apply_sort(
    query: BoxedQuery<'static, Constituent>,
    column: ConstituentColumn,
    direction: SortDirection,
) -> BoxedQuery<'static, Constituent> {
    match column {
        ConstituentColumn::Id => order_by_column!(query, constituents::id, direction),
        ConstituentColumn::FirstName => {
            order_by_column!(query, constituents::first_name, direction)
        }
        ConstituentColumn::LastName => order_by_column!(query, constituents::last_name, direction),
        ConstituentColumn::Email => order_by_column!(query, constituents::email, direction),
        ConstituentColumn::Phone => order_by_column!(query, constituents::phone, direction),
        ConstituentColumn::SignUpTime => {
            order_by_column!(query, constituents::sign_up_time, direction)
        }
        ConstituentColumn::UpdatedTime => {
            order_by_column!(query, constituents::updated_time, direction)
        }
        ConstituentColumn::Active => order_by_column!(query, constituents::active, direction),
        ConstituentColumn::Address => order_by_column!(query, constituents::address, direction),
        ConstituentColumn::City => order_by_column!(query, constituents::city, direction),
        ConstituentColumn::State => order_by_column!(query, constituents::state, direction),
        ConstituentColumn::ZipCode => order_by_column!(query, constituents::zip_code, direction),
        ConstituentColumn::PreferredContactMethod => {
            order_by_column!(query, constituents::preferred_contact_method, direction)
        }
        ConstituentColumn::LastContactDate => {
            order_by_column!(query, constituents::last_contact_date, direction)
        }
    }
}

fn apply_filter(
    query: BoxedQuery<'static, Constituent>,
    filter: ColumnFilter,
) -> BoxedQuery<'static, Constituent> {
    match filter {
        ColumnFilter::Id(id) => query.filter(constituents::id.eq(id)),
        ColumnFilter::Active(status) => query.filter(constituents::active.eq(status)),
        ColumnFilter::FirstName(value) => query.filter(constituents::first_name.eq(value)),
        ColumnFilter::LastName(value) => query.filter(constituents::last_name.eq(value)),
        ColumnFilter::Email(value) => query.filter(constituents::email.eq(value)),
        ColumnFilter::Phone(value) => query.filter(constituents::phone.eq(value)),
        ColumnFilter::Address(value) => query.filter(constituents::address.eq(value)),
        ColumnFilter::City(value) => query.filter(constituents::city.eq(value)),
        ColumnFilter::State(value) => query.filter(constituents::state.eq(value)),
        ColumnFilter::ZipCode(value) => query.filter(constituents::zip_code.eq(value)),
        ColumnFilter::PreferredContactMethod(value) => {
            query.filter(constituents::preferred_contact_method.eq(value))
        }
    }
}

/// ## Summary
/// Builds the listing query for the given criteria.
///
/// Results are ordered by the requested column with `id` as a tiebreaker,
/// or by `id` alone when no sort is requested.
#[must_use]
pub fn filtered(criteria: ListCriteria) -> BoxedQuery<'static, Constituent> {
    let mut query = all();

    if let Some(term) = criteria.search.as_deref() {
        let pattern = like_pattern(term);
        query = query.filter(
            constituents::first_name
                .ilike(pattern.clone())
                .or(constituents::last_name.ilike(pattern)),
        );
    }

    if let Some(filter) = criteria.filter {
        query = apply_filter(query, filter);
    }

    query = match criteria.sort {
        Some((column, direction)) => {
            apply_sort(query, column, direction).then_order_by(constituents::id.asc())
        }
        None => query.order(constituents::id.asc()),
    };

    if let Some(limit) = criteria.limit {
        query = query.limit(limit);
    }
    if let Some(offset) = criteria.offset {
        query = query.offset(offset);
    }

    query
}

/// ## Summary
/// Loads constituents matching the listing criteria.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn list(
    conn: &mut DbConnection<'_>,
    criteria: ListCriteria,
) -> diesel::QueryResult<Vec<Constituent>> {
    filtered(criteria).load::<Constituent>(conn).await
}

/// ## Summary
/// Retrieves a constituent by ID.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn get(conn: &mut DbConnection<'_>, id: i32) -> diesel::QueryResult<Option<Constituent>> {
    by_id(id).first::<Constituent>(conn).await.optional()
}

/// ## Summary
/// Retrieves a constituent by exact email and locks the row until the
/// surrounding transaction ends.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn lock_by_email(
    conn: &mut DbConnection<'_>,
    email: &str,
) -> diesel::QueryResult<Option<Constituent>> {
    constituents::table
        .filter(constituents::email.eq(email))
        .select(Constituent::as_select())
        .for_update()
        .first::<Constituent>(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a constituent unless the email is already taken.
///
/// Returns `None` when another row already owns the email.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn insert_if_absent(
    conn: &mut DbConnection<'_>,
    new_constituent: &NewConstituent<'_>,
) -> diesel::QueryResult<Option<Constituent>> {
    diesel::insert_into(constituents::table)
        .values(new_constituent)
        .on_conflict(constituents::email)
        .do_nothing()
        .returning(Constituent::as_returning())
        .get_result::<Constituent>(conn)
        .await
        .optional()
}

/// ## Summary
/// Applies changes to a constituent by ID.
///
/// Returns `None` when no row has the ID.
///
/// ## Errors
/// Returns a database error if the update fails.
pub async fn update_by_id(
    conn: &mut DbConnection<'_>,
    id: i32,
    changes: &ConstituentChanges<'_>,
) -> diesel::QueryResult<Option<Constituent>> {
    diesel::update(constituents::table.filter(constituents::id.eq(id)))
        .set(changes)
        .returning(Constituent::as_returning())
        .get_result::<Constituent>(conn)
        .await
        .optional()
}

/// ## Summary
/// Counts constituents with the given email.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn count_by_email(
    conn: &mut DbConnection<'_>,
    email: &str,
) -> diesel::QueryResult<i64> {
    constituents::table
        .filter(constituents::email.eq(email))
        .count()
        .get_result::<i64>(conn)
        .await
}

/// ## Summary
/// Counts all constituents.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn count_all(conn: &mut DbConnection<'_>) -> diesel::QueryResult<i64> {
    constituents::table.count().get_result::<i64>(conn).await
}
