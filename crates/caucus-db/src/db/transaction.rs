//! Transaction helper utilities for database operations.
//!
//! ## Usage
//!
//! Wrap the operations that must commit together in a closure:
//!
//! ```rust,ignore
//! use diesel_async::scoped_futures::ScopedFutureExt;
//! use caucus_db::db::transaction::with_transaction;
//!
//! let email = email.to_owned();
//! with_transaction(conn, |tx| async move {
//!     let existing = constituent::lock_by_email(tx, &email).await?;
//!     constituent::update_by_id(tx, id, &changes).await?;
//!     Ok(())
//! }.scope_boxed()).await?;
//! ```

use diesel_async::{AsyncConnection, scoped_futures::ScopedBoxFuture};

use crate::db::connection::DbConnection;

/// ## Summary
/// Runs a database transaction and returns the closure result.
///
/// The transaction is rolled back when the closure returns an error. The
/// closure should own what it captures.
///
/// ## Errors
/// Returns any error produced by the closure, or errors raised while starting
/// or committing the transaction.
pub async fn with_transaction<'a, 'b, 'pool, T, E, F>(
    conn: &'b mut DbConnection<'pool>,
    callback: F,
) -> Result<T, E>
where
    F: for<'r> FnOnce(&'r mut DbConnection<'pool>) -> ScopedBoxFuture<'a, 'r, Result<T, E>>
        + Send
        + 'a,
    T: Send + 'a,
    E: From<diesel::result::Error> + Send + 'a,
    'a: 'b,
{
    conn.transaction::<T, E, F>(callback).await
}
