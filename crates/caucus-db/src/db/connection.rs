use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use caucus_core::config::DatabaseConfig;

use crate::db::DbProvider;
use crate::error::DbResult;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'pool> = PooledConnection<'pool, AsyncPgConnection>;

/// How long a request waits for a free connection before failing.
const CHECKOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// ## Summary
/// Builds a pool of at most `size` connections to `database_url`.
///
/// Connections are opened lazily; the first checkout fails if the server is
/// unreachable.
///
/// ## Errors
/// Returns an error if the pool cannot be built.
#[tracing::instrument(skip(database_url), fields(pool_size = size))]
pub async fn create_pool(database_url: &str, size: u32) -> DbResult<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);

    let pool = Pool::builder()
        .max_size(size.max(1))
        .min_idle(None)
        .connection_timeout(CHECKOUT_TIMEOUT)
        .build(manager)
        .await?;

    tracing::debug!("Database pool ready");

    Ok(pool)
}

/// ## Summary
/// Builds the pool described by the `database` configuration section.
///
/// ## Errors
/// Returns an error if the pool cannot be built.
pub async fn connect(config: &DatabaseConfig) -> DbResult<DbPool> {
    create_pool(&config.connection_url(), u32::from(config.max_connections)).await
}

impl DbProvider for DbPool {
    fn get_connection<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = DbResult<DbConnection<'a>>> + Send + 'a>> {
        Box::pin(async move {
            self.get().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to check out a database connection");
                e.into()
            })
        })
    }
}
