//! Start-up checks that the backend supports the SQL the store relies on.
//!
//! Inserts use `RETURNING` to hand the generated identifier back to callers,
//! so `SQLite` must be at least 3.35. PostgreSQL has supported it for ever,
//! but we still insist on a maintained major version.

use diesel::{QueryableByName, result::Error as DieselError, result::QueryResult, sql_types::Text};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;

#[derive(QueryableByName)]
struct VersionRow {
    #[diesel(sql_type = Text)]
    version: String,
}

fn unsupported(msg: String) -> DieselError {
    DieselError::QueryBuilderError(Box::new(std::io::Error::other(msg)))
}

/// Parse the leading `major.minor` pair from a version string.
fn major_minor(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.');
    let major = parts.next()?.trim().parse().ok()?;
    let minor = parts
        .next()
        .and_then(|m| m.trim().parse().ok())
        .unwrap_or(0);
    Some((major, minor))
}

/// Verify that `SQLite` supports `RETURNING` clauses.
///
/// # Errors
/// Returns an error when the version query fails or the library predates 3.35.
#[cfg(feature = "sqlite")]
pub async fn audit_sqlite_features(conn: &mut DbConnection) -> QueryResult<()> {
    let row: VersionRow = diesel::sql_query("SELECT sqlite_version() AS version")
        .get_result(conn)
        .await?;
    match major_minor(&row.version) {
        Some(v) if v >= (3, 35) => Ok(()),
        Some(_) => Err(unsupported(format!(
            "sqlite {} lacks RETURNING support (require >= 3.35)",
            row.version
        ))),
        None => Err(unsupported(format!(
            "unable to parse sqlite version: {}",
            row.version
        ))),
    }
}

/// Verify that the PostgreSQL server is version 14 or newer.
///
/// # Errors
/// Returns an error when the version query fails or the server is too old.
#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
pub async fn audit_postgres_features(conn: &mut DbConnection) -> QueryResult<()> {
    let row: VersionRow = diesel::sql_query("SELECT current_setting('server_version') AS version")
        .get_result(conn)
        .await?;
    match major_minor(&row.version) {
        Some((major, _)) if major >= 14 => Ok(()),
        Some((major, _)) => Err(unsupported(format!(
            "postgres version {major} is not supported (require >= 14)"
        ))),
        None => Err(unsupported(format!(
            "unable to parse postgres version: {}",
            row.version
        ))),
    }
}
