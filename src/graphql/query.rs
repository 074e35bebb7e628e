//! Read-side resolvers.

use async_graphql::{Context, Object, Result};

use super::{
    app_context,
    into_graphql_error,
    types::{BlogObject, HospitalObject, RecordObject},
};
use crate::operations;

fn convert<T, U: From<T>>(rows: Vec<T>) -> Vec<U> { rows.into_iter().map(U::from).collect() }

/// Root query type.
#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Hospitals offering a department, matched against zh and en names.
    async fn hospitals_by_department(
        &self,
        ctx: &Context<'_>,
        department: String,
    ) -> Result<Vec<HospitalObject>> {
        operations::hospitals_by_department(app_context(ctx)?, &department)
            .await
            .map(convert)
            .map_err(into_graphql_error)
    }

    /// Hospitals whose name contains the given text.
    async fn hospitals_by_name(&self, ctx: &Context<'_>, name: String) -> Result<Vec<HospitalObject>> {
        operations::hospitals_by_name(app_context(ctx)?, &name)
            .await
            .map(convert)
            .map_err(into_graphql_error)
    }

    async fn get_all_hospitals(&self, ctx: &Context<'_>) -> Result<Vec<HospitalObject>> {
        operations::all_hospitals(app_context(ctx)?)
            .await
            .map(convert)
            .map_err(into_graphql_error)
    }

    async fn blogs(&self, ctx: &Context<'_>) -> Result<Vec<BlogObject>> {
        operations::all_blogs(app_context(ctx)?)
            .await
            .map(convert)
            .map_err(into_graphql_error)
    }

    /// Blog posts whose text, author, date or tag contain the keyword.
    async fn search_blogs(&self, ctx: &Context<'_>, keyword: String) -> Result<Vec<BlogObject>> {
        operations::search_blogs(app_context(ctx)?, &keyword)
            .await
            .map(convert)
            .map_err(into_graphql_error)
    }

    /// Medical records, optionally limited to one owner.
    async fn records(
        &self,
        ctx: &Context<'_>,
        user_em: Option<String>,
    ) -> Result<Vec<RecordObject>> {
        operations::all_records(app_context(ctx)?, user_em.as_deref())
            .await
            .map(convert)
            .map_err(into_graphql_error)
    }

    async fn search_records(
        &self,
        ctx: &Context<'_>,
        keyword: String,
    ) -> Result<Vec<RecordObject>> {
        operations::search_records(app_context(ctx)?, &keyword)
            .await
            .map(convert)
            .map_err(into_graphql_error)
    }
}
