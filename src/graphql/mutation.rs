//! Write-side resolvers.

use async_graphql::{Context, ID, Object, Result};

use super::{
    app_context,
    into_graphql_error,
    types::{BlogInput, BlogObject, RecordInput, RecordObject},
};
use crate::{
    models::NewRecord,
    operations::{self, BlogDraft},
};

/// Root mutation type.
#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_blog(&self, ctx: &Context<'_>, input: BlogInput) -> Result<BlogObject> {
        operations::create_blog(app_context(ctx)?, &BlogDraft::from(input))
            .await
            .map(BlogObject::from)
            .map_err(into_graphql_error)
    }

    /// Store several records at once, in order.
    async fn add_records(
        &self,
        ctx: &Context<'_>,
        input: Vec<RecordInput>,
    ) -> Result<Vec<RecordObject>> {
        let batch: Vec<NewRecord> = input.into_iter().map(NewRecord::from).collect();
        operations::add_records(app_context(ctx)?, &batch)
            .await
            .map(|rows| rows.into_iter().map(RecordObject::from).collect())
            .map_err(into_graphql_error)
    }

    async fn add_one_record(&self, ctx: &Context<'_>, input: RecordInput) -> Result<RecordObject> {
        operations::add_one_record(app_context(ctx)?, &NewRecord::from(input))
            .await
            .map(RecordObject::from)
            .map_err(into_graphql_error)
    }

    /// Delete a record by id; `true` once removed.
    async fn delete_record(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        operations::delete_record(app_context(ctx)?, id.as_str())
            .await
            .map_err(into_graphql_error)
    }
}
