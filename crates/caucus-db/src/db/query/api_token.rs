//! Query functions for issued bearer tokens.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::api_tokens;
use crate::model::api_token::{ApiToken, NewApiToken};

/// ## Summary
/// Stores a newly issued token.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn create_token(
    conn: &mut DbConnection<'_>,
    new_token: &NewApiToken<'_>,
) -> diesel::QueryResult<ApiToken> {
    diesel::insert_into(api_tokens::table)
        .values(new_token)
        .returning(ApiToken::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Finds an unexpired token by its digest.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn find_valid(
    conn: &mut DbConnection<'_>,
    token_hash: &str,
    now: DateTime<Utc>,
) -> diesel::QueryResult<Option<ApiToken>> {
    api_tokens::table
        .filter(api_tokens::token_hash.eq(token_hash))
        .filter(api_tokens::expires_at.gt(now))
        .select(ApiToken::as_select())
        .first::<ApiToken>(conn)
        .await
        .optional()
}

/// ## Summary
/// Deletes tokens that expired before `now`. Returns the number removed.
///
/// ## Errors
/// Returns a database error if the delete fails.
pub async fn purge_expired(
    conn: &mut DbConnection<'_>,
    now: DateTime<Utc>,
) -> diesel::QueryResult<usize> {
    diesel::delete(api_tokens::table.filter(api_tokens::expires_at.le(now)))
        .execute(conn)
        .await
}
