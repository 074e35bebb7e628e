//! Community blog operations.

use tracing::info;

use super::OperationError;
use crate::{
    context::AppContext,
    db,
    models::{Blog, BlogTag, NewBlog},
};

/// A blog post as submitted by the editor form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogDraft {
    /// Client-assigned post number.
    pub post_id: i32,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Author display name.
    pub author: String,
    /// Publication date as `YYYY-MM-DD`.
    pub publication_date: String,
    /// Category.
    pub tag: BlogTag,
}

/// Every blog post.
///
/// # Errors
/// Returns [`OperationError::Unavailable`] when the store cannot be queried.
pub async fn all_blogs(ctx: &AppContext) -> Result<Vec<Blog>, OperationError> {
    let mut conn = ctx.conn().await?;
    Ok(db::list_blogs(&mut conn).await?)
}

/// Blog posts whose title, content, author, date or tag contain `keyword`.
///
/// # Errors
/// Returns [`OperationError::Unavailable`] when the store cannot be queried.
pub async fn search_blogs(ctx: &AppContext, keyword: &str) -> Result<Vec<Blog>, OperationError> {
    let mut conn = ctx.conn().await?;
    Ok(db::search_blogs(&mut conn, keyword).await?)
}

/// Store `draft` as a new post. Identical drafts are stored twice.
///
/// # Errors
/// Returns [`OperationError::Unavailable`] when the insert fails.
pub async fn create_blog(ctx: &AppContext, draft: &BlogDraft) -> Result<Blog, OperationError> {
    let mut conn = ctx.conn().await?;
    let blog = db::create_blog(
        &mut conn,
        &NewBlog {
            post_id: draft.post_id,
            title: &draft.title,
            content: &draft.content,
            author: &draft.author,
            publication_date: &draft.publication_date,
            tag: draft.tag.as_str(),
        },
    )
    .await?;
    info!(id = blog.id, post_id = blog.post_id, tag = %draft.tag, "blog post created");
    Ok(blog)
}
