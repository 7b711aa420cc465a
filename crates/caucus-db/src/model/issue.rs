use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::issues)]
#[diesel(check_for_backend(Pg))]
pub struct Issue {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Number of times constituents raised the issue.
    pub count: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::issues)]
pub struct NewIssue<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub count: i32,
}
