//! Hospital collection helpers.
//!
//! The application never mutates hospitals; [`create_hospital`] exists for
//! provisioning and fixtures.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::{
    connection::DbConnection,
    pattern::{LIKE_ESCAPE, contains_pattern, lower},
};
use crate::models::{Hospital, NewHospital};

/// Load every hospital in store order.
///
/// # Errors
/// Returns any error produced by the underlying database query.
pub async fn list_hospitals(conn: &mut DbConnection) -> QueryResult<Vec<Hospital>> {
    use crate::schema::hospitals::dsl::hospitals;
    hospitals.load::<Hospital>(conn).await
}

/// Load hospitals offering a department whose name contains `department`.
///
/// Both the Chinese and the English department lists are searched.
///
/// # Errors
/// Returns any error produced by the underlying database query.
pub async fn hospitals_by_department(
    conn: &mut DbConnection,
    department: &str,
) -> QueryResult<Vec<Hospital>> {
    use crate::schema::hospitals::dsl as h;
    let pat = contains_pattern(department);
    h::hospitals
        .filter(
            lower(h::departments_zh)
                .like(pat.as_str())
                .escape(LIKE_ESCAPE)
                .or(lower(h::departments_en).like(pat.as_str()).escape(LIKE_ESCAPE)),
        )
        .load::<Hospital>(conn)
        .await
}

/// Load hospitals whose name contains `name`, ignoring case.
///
/// # Errors
/// Returns any error produced by the underlying database query.
pub async fn hospitals_by_name(conn: &mut DbConnection, name: &str) -> QueryResult<Vec<Hospital>> {
    use crate::schema::hospitals::dsl as h;
    let pat = contains_pattern(name);
    h::hospitals
        .filter(lower(h::name).like(pat.as_str()).escape(LIKE_ESCAPE))
        .load::<Hospital>(conn)
        .await
}

/// Insert a hospital listing and return the stored row.
///
/// # Errors
/// Returns any error produced by the insertion query.
pub async fn create_hospital(
    conn: &mut DbConnection,
    hospital: &NewHospital<'_>,
) -> QueryResult<Hospital> {
    use crate::schema::hospitals::dsl::hospitals;
    diesel::insert_into(hospitals)
        .values(hospital)
        .get_result(conn)
        .await
}
