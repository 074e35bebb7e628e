//! GraphQL surface over the named operations.
//!
//! Resolvers pull the shared [`AppContext`] from the schema data and convert
//! [`OperationError`]s into GraphQL errors carrying an `extensions.code`.

mod mutation;
mod query;
pub mod types;

use async_graphql::{EmptySubscription, Error, ErrorExtensions, Schema};
use tracing::error;

pub use self::{mutation::MutationRoot, query::QueryRoot};
use crate::{context::AppContext, operations::OperationError};

/// Executable schema served at `/graphql`.
pub type HealthhubSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with `ctx` attached as request data.
#[must_use]
pub fn build_schema(ctx: AppContext) -> HealthhubSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(ctx)
        .finish()
}

fn app_context<'a>(ctx: &async_graphql::Context<'a>) -> async_graphql::Result<&'a AppContext> {
    ctx.data::<AppContext>()
}

/// Convert an operation failure into a GraphQL error with a machine code.
fn into_graphql_error(err: OperationError) -> Error {
    if !err.is_client_error() {
        error!(error = ?err, "graphql operation failed");
    }
    let code = err.code();
    Error::new(err.to_string()).extend_with(|_, ext| ext.set("code", code))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn sdl_exposes_page_field_names() {
        let sdl = Schema::build(QueryRoot, MutationRoot, EmptySubscription)
            .finish()
            .sdl();
        for needle in [
            "hospitalsByDepartment(department: String!): [Hospital!]!",
            "getAllHospitals: [Hospital!]!",
            "records(userEm: String): [Record!]!",
            "searchRecords(keyword: String!): [Record!]!",
            "deleteRecord(id: ID!): Boolean!",
            "addRecords(input: [RecordInput!]!): [Record!]!",
            "createBlog(input: BlogInput!): Blog!",
            "_id: ID!",
            "departments_en: [String!]!",
            "publication_date: String!",
            "Disease: String!",
            "userEm: String!",
        ] {
            assert!(sdl.contains(needle), "schema is missing `{needle}`:\n{sdl}");
        }
    }

    #[rstest]
    fn errors_carry_extension_code() {
        let err = into_graphql_error(OperationError::InvalidId);
        assert_eq!(err.message, "Invalid ID format");
        let code = err
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("BAD_USER_INPUT")));
    }
}
