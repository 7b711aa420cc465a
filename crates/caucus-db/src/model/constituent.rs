use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

/// A person record managed by the CRM.
///
/// `active` is a status marker; soft deletes set it to a non-zero value
/// instead of removing the row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::constituents)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct Constituent {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub sign_up_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    pub active: i32,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub preferred_contact_method: Option<String>,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Insert payload. `sign_up_time` falls back to the column default when `None`.
#[derive(Debug, Clone, Default, Insertable)]
#[diesel(table_name = schema::constituents)]
pub struct NewConstituent<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub sign_up_time: Option<DateTime<Utc>>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub zip_code: Option<&'a str>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub preferred_contact_method: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub tags: Option<Vec<String>>,
}

/// Partial update. `None` fields are left untouched by Diesel.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = schema::constituents)]
pub struct ConstituentChanges<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub active: Option<i32>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub zip_code: Option<&'a str>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub preferred_contact_method: Option<&'a str>,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub notes: Option<&'a str>,
    pub tags: Option<Vec<String>>,
    pub updated_time: Option<DateTime<Utc>>,
}
