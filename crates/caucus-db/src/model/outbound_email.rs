use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// A queued email waiting for the delivery worker.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::outbound_emails)]
#[diesel(check_for_backend(Pg))]
pub struct OutboundEmail {
    pub id: uuid::Uuid,
    pub recipient: String,
    pub constituent_id: Option<i32>,
    pub subject: String,
    pub body: String,
    pub queued_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::outbound_emails)]
pub struct NewOutboundEmail<'a> {
    pub id: uuid::Uuid,
    pub recipient: &'a str,
    pub constituent_id: Option<i32>,
    pub subject: &'a str,
    pub body: &'a str,
}
