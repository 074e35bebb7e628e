//! Medical record collection helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::{
    connection::DbConnection,
    pattern::{LIKE_ESCAPE, contains_pattern, lower},
};
use crate::models::{NewRecord, Record};

/// Load records, optionally narrowed to a single owner email.
///
/// # Errors
/// Returns any error produced by the underlying database query.
pub async fn list_records(
    conn: &mut DbConnection,
    owner: Option<&str>,
) -> QueryResult<Vec<Record>> {
    use crate::schema::records::dsl as r;
    let mut query = r::records.into_boxed();
    if let Some(email) = owner {
        query = query.filter(r::user_em.eq(email));
    }
    query.load::<Record>(conn).await
}

/// Load records whose clinical fields contain `keyword`, ignoring case.
///
/// The owner email is deliberately not searched.
///
/// # Errors
/// Returns any error produced by the underlying database query.
pub async fn search_records(conn: &mut DbConnection, keyword: &str) -> QueryResult<Vec<Record>> {
    use crate::schema::records::dsl as r;
    let pat = contains_pattern(keyword);
    r::records
        .filter(
            lower(r::disease)
                .like(pat.as_str())
                .escape(LIKE_ESCAPE)
                .or(lower(r::symptoms).like(pat.as_str()).escape(LIKE_ESCAPE))
                .or(lower(r::medications).like(pat.as_str()).escape(LIKE_ESCAPE))
                .or(lower(r::duration).like(pat.as_str()).escape(LIKE_ESCAPE))
                .or(lower(r::hospital).like(pat.as_str()).escape(LIKE_ESCAPE))
                .or(lower(r::clinic).like(pat.as_str()).escape(LIKE_ESCAPE)),
        )
        .load::<Record>(conn)
        .await
}

/// Insert one record and return the stored row.
///
/// # Errors
/// Returns any error produced by the insertion query.
pub async fn create_record(conn: &mut DbConnection, record: &NewRecord) -> QueryResult<Record> {
    use crate::schema::records::dsl::records;
    diesel::insert_into(records)
        .values(record)
        .get_result(conn)
        .await
}

/// Insert several records in order, returning the stored rows.
///
/// Rows are written one statement at a time without a surrounding
/// transaction; a failure part-way leaves earlier rows in place.
///
/// # Errors
/// Returns the first error produced by an insertion.
pub async fn create_records(
    conn: &mut DbConnection,
    batch: &[NewRecord],
) -> QueryResult<Vec<Record>> {
    let mut stored = Vec::with_capacity(batch.len());
    for record in batch {
        stored.push(create_record(conn, record).await?);
    }
    Ok(stored)
}

/// Delete the record with the given identifier, returning the number removed.
///
/// # Errors
/// Returns any error produced by the delete statement.
pub async fn delete_record(conn: &mut DbConnection, record_id: i32) -> QueryResult<usize> {
    use crate::schema::records::dsl::{id, records};
    diesel::delete(records.filter(id.eq(record_id)))
        .execute(conn)
        .await
}

/// Count stored records.
///
/// # Errors
/// Returns any error produced by the count query.
pub async fn count_records(conn: &mut DbConnection) -> QueryResult<i64> {
    use crate::schema::records::dsl::records;
    records.count().get_result(conn).await
}
