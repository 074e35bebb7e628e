//! Client-side helper for calling the GraphQL endpoint.
//!
//! Mirrors what the portal pages do: post `{query, variables}`, read the body
//! as text, and either hand back `data` or surface the first reported error.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Failures reported by [`GraphQlClient::fetch`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with at least one GraphQL error.
    #[error("{code}: {message}")]
    Reported {
        /// `extensions.code` of the first error, or `UNKNOWN` when absent.
        code: String,
        /// Message of the first error.
        message: String,
    },
    /// The request could not be sent or the response could not be read.
    #[error("Error in sending data to server: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not a GraphQL response document.
    #[error("Error in sending data to server: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    message: String,
    #[serde(default)]
    extensions: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

/// Minimal GraphQL-over-HTTP client.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GraphQlClient {
    /// Create a client posting to `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Execute `query` with `variables` and return the `data` member.
    ///
    /// # Errors
    /// Returns [`FetchError::Reported`] when the response carries errors and
    /// [`FetchError::Transport`] or [`FetchError::Decode`] when the exchange
    /// itself fails.
    pub async fn fetch(&self, query: &str, variables: Value) -> Result<Value, FetchError> {
        debug!(endpoint = %self.endpoint, "posting graphql operation");
        let text = self
            .http
            .post(&self.endpoint)
            .json(&json!({"query": query, "variables": variables}))
            .send()
            .await?
            .text()
            .await?;
        unwrap_response(&text)
    }
}

fn unwrap_response(text: &str) -> Result<Value, FetchError> {
    let body: ResponseBody = serde_json::from_str(text)?;
    if let Some(first) = body.errors.into_iter().next() {
        let code = first
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_owned();
        return Err(FetchError::Reported {
            code,
            message: first.message,
        });
    }
    Ok(body.data.unwrap_or(Value::Null))
}
