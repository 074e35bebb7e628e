//! Help-bot proxy.

use serde_json::Value;
use tracing::warn;

use super::OperationError;
use crate::context::AppContext;

/// Forward `message` to the chat-completion service and return its reply
/// verbatim.
///
/// # Errors
/// Returns [`OperationError::Upstream`] when the service fails.
pub async fn bot_response(ctx: &AppContext, message: &str) -> Result<Value, OperationError> {
    ctx.chatbot.reply(message).await.map_err(|e| {
        warn!(error = %e, "chatbot request failed");
        OperationError::Upstream(Box::new(e))
    })
}
