//! Manage database connections and per-collection queries.
//!
//! This module tree exposes helpers for creating pooled Diesel connections,
//! running embedded migrations, auditing backend capabilities, and executing
//! the single-statement reads and writes behind each collection.

mod appointments;
mod audit;
mod blogs;
mod connection;
mod hospitals;
mod migrations;
mod pattern;
mod records;
mod users;


#[cfg(all(feature = "postgres", not(feature = "sqlite")))]
pub use self::audit::audit_postgres_features;
#[cfg(feature = "sqlite")]
pub use self::{audit::audit_sqlite_features, connection::BUSY_TIMEOUT_MS};
pub use self::{
    appointments::{SlotKey, count_appointments, create_appointment, find_appointment},
    blogs::{create_blog, list_blogs, search_blogs},
    connection::{
        Backend,
        DEFAULT_POOL_SIZE,
        DbConnection,
        DbPool,
        MIGRATIONS,
        connect,
        establish_pool,
    },
    hospitals::{create_hospital, hospitals_by_department, hospitals_by_name, list_hospitals},
    migrations::{MIGRATION_TIMEOUT, apply_migrations, run_migrations},
    pattern::contains_pattern,
    records::{
        count_records,
        create_record,
        create_records,
        delete_record,
        list_records,
        search_records,
    },
    users::{create_user, get_user_by_email},
};

/// Whether a Diesel error reports a UNIQUE constraint violation.
#[must_use]
pub const fn is_unique_violation(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        )
    )
}

/// Fresh in-memory `SQLite` store with every collection table created.
#[cfg(all(test, feature = "sqlite"))]
pub(crate) async fn migrated_memory_store() -> DbConnection {
    let mut conn = connect(":memory:")
        .await
        .expect("failed to open in-memory store");
    run_migrations(&mut conn)
        .await
        .expect("failed to apply migrations");
    conn
}
