use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::WidgetError;
use crate::theme::ColorPalette;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Every request gets the same bounded timeout; the widget never retries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct ChatRequest<'a> {
    tenant_id: Option<i64>,
    session_id: Option<i64>,
    message: &'a str,
}

/// Tenant branding loaded once at startup via the widget API key.
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetConfig {
    pub tenant_id: i64,
    pub chatbot_name: String,
    pub colors: ColorPalette,
    #[serde(default)]
    pub company_name: Option<String>,
}

/// Assistant reply to a sent message. The server echoes extra fields
/// (`message_id`, `created_at`) which the widget ignores.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub session_id: i64,
    pub content: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Source {
    #[serde(default)]
    pub url: String,
}

#[derive(Deserialize)]
struct HistoryResponse {
    messages: Vec<HistoryMessage>,
}

/// One prior message of a stored session. `role` is "human" or "ai" on the
/// wire; `meta` may be null.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub meta: Option<MessageMeta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageMeta {
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Thin client for the three widget endpoints. One attempt per call, no
/// retry; callers decide whether a failure degrades silently or surfaces.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn fetch_config(&self, api_key: &str) -> Result<WidgetConfig, WidgetError> {
        let url = format!("{}/widgets/config", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", api_key)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(WidgetError::ConfigFetch)?;

        response.json().await.map_err(WidgetError::ConfigFetch)
    }

    pub async fn send_message(
        &self,
        tenant_id: Option<i64>,
        session_id: Option<i64>,
        message: &str,
    ) -> Result<ChatReply, WidgetError> {
        let url = format!("{}/chat/message", self.base_url);

        let request = ChatRequest {
            tenant_id,
            session_id,
            message,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(WidgetError::SendFailed)?;

        response.json().await.map_err(WidgetError::SendFailed)
    }

    pub async fn fetch_history(&self, session_id: i64) -> Result<Vec<HistoryMessage>, WidgetError> {
        let url = format!("{}/chat/sessions/{}/messages", self.base_url, session_id);

        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(WidgetError::HistoryLoadFailed)?;

        let body: HistoryResponse = response
            .json()
            .await
            .map_err(WidgetError::HistoryLoadFailed)?;
        Ok(body.messages)
    }
}
