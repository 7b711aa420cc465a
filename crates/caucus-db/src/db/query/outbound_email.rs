//! Query functions for the outbound email queue.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::outbound_emails;
use crate::model::outbound_email::{NewOutboundEmail, OutboundEmail};

/// ## Summary
/// Queues a batch of emails. Returns the number of rows inserted.
///
/// ## Errors
/// Returns a database error if the insert fails.
pub async fn enqueue(
    conn: &mut DbConnection<'_>,
    emails: &[NewOutboundEmail<'_>],
) -> diesel::QueryResult<usize> {
    diesel::insert_into(outbound_emails::table)
        .values(emails)
        .execute(conn)
        .await
}

/// ## Summary
/// Lists emails not yet delivered, oldest first.
///
/// ## Errors
/// Returns a database error if the query fails.
pub async fn pending(conn: &mut DbConnection<'_>) -> diesel::QueryResult<Vec<OutboundEmail>> {
    outbound_emails::table
        .filter(outbound_emails::sent_at.is_null())
        .select(OutboundEmail::as_select())
        .order((outbound_emails::queued_at.asc(), outbound_emails::id.asc()))
        .load::<OutboundEmail>(conn)
        .await
}
