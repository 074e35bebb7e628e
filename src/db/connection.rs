//! Database handles: backend aliases, per-connection setup and the pool.
//!
//! Every connection the store hands out goes through [`connect`], whether it
//! backs a pooled request handler, an admin command or a test fixture.

use std::{future::Future, pin::Pin};

use cfg_if::cfg_if;
use diesel::ConnectionResult;
use diesel_async::{
    AsyncConnection,
    pooled_connection::{AsyncDieselConnectionManager, ManagerConfig, PoolError, bb8::Pool},
};
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

cfg_if! {
    if #[cfg(all(feature = "sqlite", feature = "postgres", not(feature = "lint")))] {
        compile_error!("Either feature 'sqlite' or 'postgres' must be enabled, not both");
    } else if #[cfg(feature = "sqlite")] {
        use diesel::sqlite::SqliteConnection;
        use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;

        /// Store backend.
        pub type Backend = diesel::sqlite::Sqlite;
        /// Collection tables for `SQLite`.
        pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/sqlite");
        /// `SQLite` runs on a blocking connection driven from a worker thread.
        pub type DbConnection = SyncConnectionWrapper<SqliteConnection>;
    } else if #[cfg(all(feature = "postgres", not(feature = "sqlite")))] {
        /// Store backend.
        pub type Backend = diesel::pg::Pg;
        /// Collection tables for PostgreSQL.
        pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/postgres");
        /// Native async PostgreSQL connection.
        pub type DbConnection = diesel_async::AsyncPgConnection;
    } else {
        compile_error!("Either feature 'sqlite' or 'postgres' must be enabled");
    }
}

/// Pool shared by every request handler.
pub type DbPool = Pool<DbConnection>;

/// Default upper bound on pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// How long a `SQLite` writer waits for a competing writer's lock.
#[cfg(feature = "sqlite")]
pub const BUSY_TIMEOUT_MS: u32 = 5_000;

type SetupFuture<'a> = Pin<Box<dyn Future<Output = ConnectionResult<DbConnection>> + Send + 'a>>;

/// Open a connection ready for the store's queries.
///
/// `SQLite` connections get a busy timeout, so concurrent writers queue
/// instead of failing with `SQLITE_BUSY`, and a Unicode-aware `lower()`.
///
/// # Errors
/// Returns a connection error when the database cannot be opened or the
/// connection cannot be configured.
#[cfg(feature = "sqlite")]
pub async fn connect(database_url: &str) -> ConnectionResult<DbConnection> {
    use diesel::connection::SimpleConnection;

    let mut conn = DbConnection::establish(database_url).await?;
    conn.spawn_blocking(|c| {
        c.batch_execute(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};"))?;
        super::pattern::register_unicode_lower(c)
    })
    .await
    .map_err(diesel::ConnectionError::CouldntSetupConfiguration)?;
    Ok(conn)
}

/// Open a connection ready for the store's queries.
///
/// # Errors
/// Returns a connection error when the database cannot be reached.
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
pub async fn connect(database_url: &str) -> ConnectionResult<DbConnection> {
    DbConnection::establish(database_url).await
}

fn pooled_setup(database_url: &str) -> SetupFuture<'_> { Box::pin(connect(database_url)) }

/// Create the long-lived connection pool shared by every request handler.
///
/// The pool is built once at start-up and injected into the request context;
/// handlers never open their own connections.
///
/// # Examples
///
/// ```no_run
/// use healthhub::db::{DEFAULT_POOL_SIZE, establish_pool};
/// async fn example() {
///     let pool = establish_pool("healthhub.db", DEFAULT_POOL_SIZE)
///         .await
///         .expect("failed to build pool");
/// }
/// ```
///
/// # Errors
/// Returns any error reported by the underlying connection pool builder.
pub async fn establish_pool(database_url: &str, max_size: u32) -> Result<DbPool, PoolError> {
    let mut setup = ManagerConfig::default();
    setup.custom_setup = Box::new(pooled_setup);
    let manager = AsyncDieselConnectionManager::<DbConnection>::new_with_config(database_url, setup);
    Pool::builder().max_size(max_size.max(1)).build(manager).await
}
