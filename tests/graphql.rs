//! GraphQL queries and mutations against a real database.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use healthhub::db::{count_records, list_blogs};
use rstest::rstest;
#[cfg(feature = "postgres")]
use serial_test::serial;
use serde_json::{Value, json};
use test_util::TestApp;

use crate::common::{app_or_skip, first_error_code, graphql, send};

const ADD_RECORDS: &str = r"
    mutation AddRecords($input: [RecordInput!]!) {
        addRecords(input: $input) { _id userEm Disease Hospital }
    }
";

const SEARCH_RECORDS: &str = r"
    query Search($keyword: String!) {
        searchRecords(keyword: $keyword) { _id Disease Hospital }
    }
";

const DELETE_RECORD: &str = r"
    mutation Delete($id: ID!) { deleteRecord(id: $id) }
";

fn record(disease: &str, hospital: &str) -> Value {
    json!({
        "userEm": "patient@example.com",
        "Disease": disease,
        "Symptoms": "Fever",
        "Medications": "Rest",
        "Duration": "7",
        "Hospital": hospital,
        "Clinic": "Family Clinic"
    })
}

async fn stored_records(app: &TestApp) -> i64 {
    let mut conn = app.ctx.pool.get().await.expect("conn");
    count_records(&mut conn).await.expect("count")
}

#[rstest]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn records_search_is_case_insensitive_substring() {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    graphql(
        app.router().expect("router"),
        ADD_RECORDS,
        json!({"input": [record("Flu", "City Hospital"), record("Asthma", "Lung Centre")]}),
    )
    .await;

    let response = graphql(
        app.router().expect("router"),
        SEARCH_RECORDS,
        json!({"keyword": "hosp"}),
    )
    .await;
    let found = response["data"]["searchRecords"]
        .as_array()
        .expect("list");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["Hospital"], "City Hospital");
}

#[rstest]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn records_filter_by_owner() {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    let mut other = record("Migraine", "Neuro Hospital");
    other["userEm"] = json!("someone@example.com");
    graphql(
        app.router().expect("router"),
        ADD_RECORDS,
        json!({"input": [record("Flu", "City Hospital"), other]}),
    )
    .await;

    let query = "query Mine($who: String) { records(userEm: $who) { userEm } }";
    let all = graphql(app.router().expect("router"), query, json!({})).await;
    assert_eq!(all["data"]["records"].as_array().map(Vec::len), Some(2));
    let mine = graphql(
        app.router().expect("router"),
        query,
        json!({"who": "someone@example.com"}),
    )
    .await;
    assert_eq!(
        mine["data"]["records"],
        json!([{"userEm": "someone@example.com"}])
    );
}

#[rstest]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn identical_creates_are_not_deduplicated() {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    let mutation = "mutation One($input: RecordInput!) { addOneRecord(input: $input) { _id } }";
    let first = graphql(
        app.router().expect("router"),
        mutation,
        json!({"input": record("Flu", "City Hospital")}),
    )
    .await;
    let second = graphql(
        app.router().expect("router"),
        mutation,
        json!({"input": record("Flu", "City Hospital")}),
    )
    .await;
    assert_ne!(
        first["data"]["addOneRecord"]["_id"],
        second["data"]["addOneRecord"]["_id"]
    );
    assert_eq!(stored_records(&app).await, 2);
}

#[rstest]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn empty_batch_returns_empty_list() {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    let response = graphql(app.router().expect("router"), ADD_RECORDS, json!({"input": []})).await;
    assert_eq!(response["data"]["addRecords"], json!([]));
    assert_eq!(stored_records(&app).await, 0);
}

#[rstest]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn delete_record_removes_exactly_one() {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    let added = graphql(
        app.router().expect("router"),
        ADD_RECORDS,
        json!({"input": [record("Flu", "City Hospital"), record("Cold", "City Hospital")]}),
    )
    .await;
    let id = added["data"]["addRecords"][0]["_id"].clone();

    let response = graphql(app.router().expect("router"), DELETE_RECORD, json!({"id": id})).await;
    assert_eq!(response["data"]["deleteRecord"], true);
    assert_eq!(stored_records(&app).await, 1);
}

#[rstest]
#[case("not-a-valid-id", "BAD_USER_INPUT", "Invalid ID format")]
#[case("987654", "NOT_FOUND", "Record not found")]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn delete_record_failures_leave_collection_unchanged(
    #[case] id: &str,
    #[case] code: &str,
    #[case] message: &str,
) {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    graphql(
        app.router().expect("router"),
        ADD_RECORDS,
        json!({"input": [record("Flu", "City Hospital")]}),
    )
    .await;

    let response = graphql(app.router().expect("router"), DELETE_RECORD, json!({"id": id})).await;
    assert_eq!(first_error_code(&response), Some(code));
    assert_eq!(response["errors"][0]["message"], message);
    assert_eq!(stored_records(&app).await, 1);
}

#[rstest]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn create_blog_stores_one_post() {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    let response = graphql(
        app.router().expect("router"),
        "mutation New($input: BlogInput!) { createBlog(input: $input) { _id id title tag } }",
        json!({"input": {"id": 11, "title": "X", "content": "Y", "author": "Z", "tag": "latest"}}),
    )
    .await;
    assert!(response.get("errors").is_none(), "{response}");
    assert_eq!(response["data"]["createBlog"]["id"], 11);
    assert_eq!(response["data"]["createBlog"]["tag"], "latest");

    let mut conn = app.ctx.pool.get().await.expect("conn");
    let blogs = list_blogs(&mut conn).await.expect("list");
    assert_eq!(blogs.len(), 1);
    assert_eq!(blogs[0].post_id, 11);
}

#[rstest]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn create_blog_rejects_unknown_tag() {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    let response = graphql(
        app.router().expect("router"),
        "mutation New($input: BlogInput!) { createBlog(input: $input) { _id } }",
        json!({"input": {"id": 1, "title": "X", "content": "Y", "author": "Z", "tag": "archived"}}),
    )
    .await;
    assert!(response["errors"].as_array().is_some_and(|e| !e.is_empty()));
    let mut conn = app.ctx.pool.get().await.expect("conn");
    assert!(list_blogs(&mut conn).await.expect("list").is_empty());
}

#[rstest]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn search_blogs_matches_author_and_tag() {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    let create = "mutation New($input: BlogInput!) { createBlog(input: $input) { _id } }";
    for (id, author, tag) in [(1, "Grace Williams", "trending"), (2, "Alan Park", "top")] {
        graphql(
            app.router().expect("router"),
            create,
            json!({"input": {
                "id": id, "title": "Post", "content": "Body", "author": author,
                "publication_date": "2024-06-10", "tag": tag
            }}),
        )
        .await;
    }
    let search = "query S($k: String!) { searchBlogs(keyword: $k) { author } }";
    let by_author = graphql(app.router().expect("router"), search, json!({"k": "grace"})).await;
    assert_eq!(
        by_author["data"]["searchBlogs"],
        json!([{"author": "Grace Williams"}])
    );
    let by_tag = graphql(app.router().expect("router"), search, json!({"k": "TOP"})).await;
    assert_eq!(by_tag["data"]["searchBlogs"], json!([{"author": "Alan Park"}]));
    let all = graphql(app.router().expect("router"), "{ blogs { id } }", json!({})).await;
    assert_eq!(all["data"]["blogs"].as_array().map(Vec::len), Some(2));
}

#[rstest]
#[case("外科", 1)]
#[case("surgery", 1)]
#[case("ophthal", 1)]
#[case("骨科", 0)]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn hospitals_by_department_matches_either_language(
    #[case] department: &str,
    #[case] expected: usize,
) {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    app.seed_hospitals().await.expect("seed");
    let response = graphql(
        app.router().expect("router"),
        "query D($d: String!) { hospitalsByDepartment(department: $d) { name departments_en } }",
        json!({"d": department}),
    )
    .await;
    assert_eq!(
        response["data"]["hospitalsByDepartment"]
            .as_array()
            .map(Vec::len),
        Some(expected)
    );
}

#[rstest]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn hospitals_expose_page_field_names() {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    app.seed_hospitals().await.expect("seed");
    let response = graphql(
        app.router().expect("router"),
        "{ getAllHospitals { _id name address_zh address_en phone intro departments_zh departments_en img_url } }",
        json!({}),
    )
    .await;
    let hospitals = response["data"]["getAllHospitals"]
        .as_array()
        .expect("list");
    assert_eq!(hospitals.len(), 2);
    let pumch = hospitals
        .iter()
        .find(|h| h["name"] == "Peking Union Medical College Hospital")
        .expect("seeded hospital");
    assert_eq!(
        pumch["departments_en"],
        json!(["Internal Medicine", "Surgery", "Pediatrics"])
    );
    assert_eq!(pumch["departments_zh"], json!(["内科", "外科", "儿科"]));

    let by_name = graphql(
        app.router().expect("router"),
        "{ hospitalsByName(name: \"EYE\") { name } }",
        json!({}),
    )
    .await;
    assert_eq!(
        by_name["data"]["hospitalsByName"],
        json!([{"name": "City Eye Hospital"}])
    );
}

#[rstest]
#[tokio::test]
#[cfg_attr(feature = "postgres", serial)]
async fn graphiql_is_served_on_get() {
    let Some(app) = app_or_skip().await.expect("setup") else {
        return;
    };
    let request = Request::builder()
        .uri("/graphql")
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(app.router().expect("router"), request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().is_some_and(|html| html.contains("graphiql")));
}
