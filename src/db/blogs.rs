//! Blog collection helpers.

use diesel::{prelude::*, result::QueryResult};
use diesel_async::RunQueryDsl;

use super::{
    connection::DbConnection,
    pattern::{LIKE_ESCAPE, contains_pattern, lower},
};
use crate::models::{Blog, NewBlog};

/// Load every blog post in store order.
///
/// # Errors
/// Returns any error produced by the underlying database query.
pub async fn list_blogs(conn: &mut DbConnection) -> QueryResult<Vec<Blog>> {
    use crate::schema::blogs::dsl::blogs;
    blogs.load::<Blog>(conn).await
}

/// Load blog posts whose textual fields contain `keyword`, ignoring case.
///
/// # Errors
/// Returns any error produced by the underlying database query.
pub async fn search_blogs(conn: &mut DbConnection, keyword: &str) -> QueryResult<Vec<Blog>> {
    use crate::schema::blogs::dsl as b;
    let pat = contains_pattern(keyword);
    b::blogs
        .filter(
            lower(b::title)
                .like(pat.as_str())
                .escape(LIKE_ESCAPE)
                .or(lower(b::content).like(pat.as_str()).escape(LIKE_ESCAPE))
                .or(lower(b::author).like(pat.as_str()).escape(LIKE_ESCAPE))
                .or(lower(b::publication_date).like(pat.as_str()).escape(LIKE_ESCAPE))
                .or(lower(b::tag).like(pat.as_str()).escape(LIKE_ESCAPE)),
        )
        .load::<Blog>(conn)
        .await
}

/// Insert a blog post verbatim and return the stored row.
///
/// # Errors
/// Returns any error produced by the insertion query.
pub async fn create_blog(conn: &mut DbConnection, blog: &NewBlog<'_>) -> QueryResult<Blog> {
    use crate::schema::blogs::dsl::blogs;
    diesel::insert_into(blogs)
        .values(blog)
        .get_result(conn)
        .await
}
