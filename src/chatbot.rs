//! Chat-completion proxy for the patient help bot.
//!
//! The portal forwards a user's message to a hosted chatbot and hands the
//! reply back untouched. [`RapidApiChatbot`] talks to the hosted service;
//! anything implementing [`ChatCompletion`] can stand in for it.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Default endpoint of the hosted chatbot.
pub const DEFAULT_CHATBOT_URL: &str = "https://custom-chatbot-api.p.rapidapi.com/chatbotapi";
/// Default value for the `x-rapidapi-host` header.
pub const DEFAULT_CHATBOT_HOST: &str = "custom-chatbot-api.p.rapidapi.com";

/// Failures while obtaining a bot reply.
#[derive(Debug, thiserror::Error)]
pub enum ChatbotError {
    /// No API key or bot id has been configured.
    #[error("chatbot credentials are not configured")]
    NotConfigured,
    /// The request never produced a usable response.
    #[error("chatbot request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("chatbot responded with status {0}")]
    Status(u16),
}

/// Something that can answer a single user message.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Obtain the service's JSON reply to `message`.
    ///
    /// # Errors
    /// Returns [`ChatbotError`] when the service is unreachable, rejects the
    /// request, or has not been configured.
    async fn reply(&self, message: &str) -> Result<Value, ChatbotError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    bot_id: &'a str,
    messages: [ChatMessage<'a>; 1],
    user_id: &'static str,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_tokens: u32,
    model: &'static str,
}

impl<'a> ChatRequest<'a> {
    const fn new(bot_id: &'a str, content: &'a str) -> Self {
        Self {
            bot_id,
            messages: [ChatMessage {
                role: "user",
                content,
            }],
            user_id: "",
            temperature: 0.9,
            top_k: 5,
            top_p: 0.9,
            max_tokens: 256,
            model: "gpt 3.5",
        }
    }
}

/// Client for the RapidAPI-hosted chatbot.
#[derive(Debug, Clone)]
pub struct RapidApiChatbot {
    client: reqwest::Client,
    url: String,
    host: String,
    api_key: String,
    bot_id: String,
}

impl RapidApiChatbot {
    /// Create a client for the service at `url`.
    #[must_use]
    pub fn new(url: String, host: String, api_key: String, bot_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            host,
            api_key,
            bot_id,
        }
    }
}

#[async_trait]
impl ChatCompletion for RapidApiChatbot {
    async fn reply(&self, message: &str) -> Result<Value, ChatbotError> {
        if self.api_key.is_empty() || self.bot_id.is_empty() {
            return Err(ChatbotError::NotConfigured);
        }
        debug!(url = %self.url, "forwarding message to chatbot");
        let response = self
            .client
            .post(&self.url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .json(&ChatRequest::new(&self.bot_id, message))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatbotError::Status(status.as_u16()));
        }
        Ok(response.json::<Value>().await?)
    }
}
