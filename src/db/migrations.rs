//! Collection tables, created from the migrations embedded in the binary.
//!
//! The Diesel migration harness is synchronous, so each run happens on a
//! blocking worker and is abandoned once [`MIGRATION_TIMEOUT`] elapses.

use std::{error::Error as StdError, future::Future, time::Duration};

use diesel::result::{Error as DieselError, QueryResult};
use diesel_migrations::MigrationHarness;
use tokio::time::timeout;
use tracing::info;

use super::connection::{Backend, DbConnection, MIGRATIONS};

/// Upper bound on a single migration run.
pub const MIGRATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
enum MigrationFailure {
    #[error("migration harness error: {0}")]
    Harness(Box<dyn StdError + Send + Sync>),
    #[error("migrations did not finish within {0:?}")]
    TimedOut(Duration),
    #[cfg(all(feature = "postgres", not(feature = "sqlite")))]
    #[error("migration connection error: {0}")]
    Connect(#[from] diesel::result::ConnectionError),
    #[cfg(all(feature = "postgres", not(feature = "sqlite")))]
    #[error("migration worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<MigrationFailure> for DieselError {
    fn from(failure: MigrationFailure) -> Self { Self::SerializationError(Box::new(failure)) }
}

fn apply_pending<C: MigrationHarness<Backend>>(conn: &mut C) -> Result<(), MigrationFailure> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(MigrationFailure::Harness)?;
    if applied.is_empty() {
        info!("collection tables up to date");
    } else {
        info!(applied = applied.len(), "collection migrations applied");
    }
    Ok(())
}

async fn within_deadline<T>(
    limit: Duration,
    run: impl Future<Output = QueryResult<T>>,
) -> QueryResult<T> {
    timeout(limit, run)
        .await
        .map_err(|_| MigrationFailure::TimedOut(limit))?
}

/// Create any missing collection tables on `conn`.
///
/// # Errors
/// Returns the harness error, or a timeout once [`MIGRATION_TIMEOUT`] passes.
#[cfg(feature = "sqlite")]
pub async fn run_migrations(conn: &mut DbConnection) -> QueryResult<()> {
    let run = conn.spawn_blocking(|c| apply_pending(c).map_err(DieselError::from));
    within_deadline(MIGRATION_TIMEOUT, run).await
}

/// Create any missing collection tables in the database at `database_url`.
///
/// The harness needs a blocking `PgConnection`, so a dedicated one is opened
/// for the run.
///
/// # Errors
/// Returns connection and harness errors, or a timeout once
/// [`MIGRATION_TIMEOUT`] passes.
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
pub async fn run_migrations(database_url: &str) -> QueryResult<()> {
    use diesel::{Connection, pg::PgConnection};

    let url = database_url.to_owned();
    let worker = tokio::task::spawn_blocking(move || -> Result<(), MigrationFailure> {
        let mut conn = PgConnection::establish(&url)?;
        apply_pending(&mut conn)
    });
    within_deadline(MIGRATION_TIMEOUT, async move {
        worker.await.map_err(MigrationFailure::from)??;
        Ok(())
    })
    .await
}

/// Run migrations through whichever handle the backend needs.
///
/// # Errors
/// Returns any error produced by [`run_migrations`].
#[cfg(feature = "sqlite")]
pub async fn apply_migrations(conn: &mut DbConnection, _database_url: &str) -> QueryResult<()> {
    run_migrations(conn).await
}

/// Run migrations through whichever handle the backend needs.
///
/// # Errors
/// Returns any error produced by [`run_migrations`].
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
pub async fn apply_migrations(_conn: &mut DbConnection, database_url: &str) -> QueryResult<()> {
    run_migrations(database_url).await
}
