//! User collection helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::connection::DbConnection;
use crate::models::{NewUser, User};

/// Look up a user by login email.
///
/// # Errors
/// Returns any error produced by the underlying database query.
pub async fn get_user_by_email(conn: &mut DbConnection, login: &str) -> QueryResult<Option<User>> {
    use crate::schema::users::dsl::{email, users};
    users
        .filter(email.eq(login))
        .first::<User>(conn)
        .await
        .optional()
}

/// Insert a new user and return the stored row.
///
/// A duplicate email surfaces as a `UniqueViolation` database error.
///
/// # Errors
/// Returns any error produced by the insertion query.
pub async fn create_user(conn: &mut DbConnection, user: &NewUser<'_>) -> QueryResult<User> {
    use crate::schema::users::dsl::users;
    diesel::insert_into(users)
        .values(user)
        .get_result(conn)
        .await
}
