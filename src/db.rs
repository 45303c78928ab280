use sea_orm::{
    sqlx::sqlite::SqliteJournalMode, ConnectOptions, ConnectionTrait, Database,
    DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, TransactionTrait,
};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{is_busy, ShopError};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_ATTEMPTS: u32 = 5;

/// Opens the connection pool.
///
/// Every connection to `sqlite::memory:` is its own empty database, so an
/// in-memory URL is always held to a single connection. File databases run in
/// WAL mode so readers never block the single writer.
pub async fn connect(url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let in_memory = url.contains(":memory:");
    let max_connections = if in_memory { 1 } else { max_connections.max(1) };

    let mut options = ConnectOptions::new(url.to_owned());
    options
        .max_connections(max_connections)
        .min_connections(1)
        .sqlx_logging(false);
    if !in_memory {
        options.map_sqlx_sqlite_opts(|opts| {
            opts.journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(BUSY_TIMEOUT)
        });
    }

    Database::connect(options).await
}

/// Opens a transaction that already holds the write lock.
///
/// SQLite refuses to upgrade a read transaction to a write one while another
/// writer is active, and it does so without consulting the busy timeout. A
/// no-op write as the first statement takes the lock while waiting is still
/// allowed.
pub(crate) async fn begin_write(db: &DatabaseConnection) -> Result<DatabaseTransaction, DbErr> {
    let txn = db.begin().await?;
    if db.get_database_backend() == DbBackend::Sqlite {
        txn.execute_unprepared("UPDATE orders SET id = id WHERE 0")
            .await?;
    }
    Ok(txn)
}

/// Runs a write transaction again while the database reports it is locked.
/// Once the attempts run out the caller gets a `Conflict` instead of a 500.
pub(crate) async fn retry_busy<T, F, Fut>(operation: &'static str, mut attempt: F) -> Result<T, ShopError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShopError>>,
{
    let mut tries = 0;
    loop {
        tries += 1;
        match attempt().await {
            Err(ShopError::Database(err)) if is_busy(&err) => {
                if tries >= WRITE_ATTEMPTS {
                    warn!(operation, tries, error = %err, "Giving up on locked database");
                    return Err(ShopError::Conflict(format!(
                        "{operation} collided with concurrent writes, try again"
                    )));
                }
                debug!(operation, tries, "Database locked, retrying");
                tokio::time::sleep(Duration::from_millis(20 * u64::from(tries))).await;
            }
            other => return other,
        }
    }
}
