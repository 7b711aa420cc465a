use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// An issued bearer token. Only the SHA-256 digest of the token is stored.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::api_tokens)]
#[diesel(check_for_backend(Pg))]
pub struct ApiToken {
    pub id: uuid::Uuid,
    pub subject: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = schema::api_tokens)]
pub struct NewApiToken<'a> {
    pub id: uuid::Uuid,
    pub subject: &'a str,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}
