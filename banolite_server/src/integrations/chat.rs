use std::sync::Arc;

use log::trace;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ChatConfig;

#[derive(Debug, Clone, Error)]
pub enum ChatApiError {
    #[error("Could not initialize the chat client. {0}")]
    Initialization(String),
    #[error("The chat relay is not configured")]
    NotConfigured,
    #[error("The chat service rejected the request: {status} {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not reach the chat service. {0}")]
    ResponseError(String),
}

#[derive(Debug, Serialize)]
struct ChatQuery<'a> {
    model: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    reply: String,
}

/// Server-side relay to the AI chat service. The storefront never talks to the model vendor directly; its key stays
/// on the server.
#[derive(Clone)]
pub struct ChatApi {
    config: ChatConfig,
    client: Arc<Client>,
}

impl ChatApi {
    pub fn new(config: ChatConfig) -> Result<Self, ChatApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.api_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| ChatApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client =
            Client::builder().default_headers(headers).build().map_err(|e| ChatApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn send(&self, message: &str, system_prompt: Option<&str>) -> Result<String, ChatApiError> {
        if self.config.api_key.is_empty() || self.config.base_url.is_empty() {
            return Err(ChatApiError::NotConfigured);
        }
        let query = ChatQuery { model: &self.config.model, message, system: system_prompt };
        trace!("🤖️ Relaying chat message ({} chars)", message.len());
        let response = self
            .client
            .post(&self.config.base_url)
            .json(&query)
            .send()
            .await
            .map_err(|e| ChatApiError::ResponseError(e.to_string()))?;
        if response.status().is_success() {
            let reply = response.json::<ChatReply>().await.map_err(|e| ChatApiError::ResponseError(e.to_string()))?;
            Ok(reply.reply)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ChatApiError::ResponseError(e.to_string()))?;
            Err(ChatApiError::QueryError { status, message })
        }
    }
}
