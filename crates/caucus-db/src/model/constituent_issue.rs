use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde::Serialize;

use crate::db::schema;

/// Link between a constituent and an issue they raised.
///
/// Both references are nullable and are cleared rather than cascaded.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = schema::constituent_issues)]
#[diesel(check_for_backend(Pg))]
#[serde(rename_all = "camelCase")]
pub struct ConstituentIssue {
    pub id: i32,
    pub constituent_id: Option<i32>,
    pub issue_id: Option<i32>,
    pub priority: Option<i32>,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::constituent_issues)]
pub struct NewConstituentIssue {
    pub constituent_id: Option<i32>,
    pub issue_id: Option<i32>,
    pub priority: Option<i32>,
}
