//! AgriBot, the farming assistant, answered by Gemini.
//!
//! Each question is sent with the conversation so far. Bot messages before
//! the first user message (the greeting) are left out, since a Gemini chat
//! must open with a user turn.
//!
//! # API Reference
//!
//! - Endpoint: `POST {base}/v1beta/models/{model}:generateContent`
//! - Authentication: `x-goog-api-key: <key>`

use std::sync::Arc;

use nongsan_core::dto::{ChatMessage, Sender, conversation_context};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;

/// Answer when no Gemini key is configured.
pub const MISSING_API_KEY: &str = "Error: API Key is missing. Please check your configuration.";
/// Answer when the assistant cannot be reached.
pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting to my knowledge base right now. Please try again later.";

const API_KEY_HEADER: &str = "x-goog-api-key";

const SYSTEM_INSTRUCTION: &str = "You are AgriBot, an expert agricultural assistant.\n\
Your goal is to help farmers and gardening enthusiasts with advice on produce, fertilizers, \
pesticides, farming equipment (specifically John Deere and similar brands), and general crop care.\n\
Keep your responses helpful, concise, and encouraging.\n\
If asked about something unrelated to agriculture, politely steer the conversation back to \
farming topics.\n\
Use formatting like bullet points for lists of recommendations.";

#[derive(Debug, Error)]
pub enum ChatbotError {
    #[error("{}", MISSING_API_KEY)]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gemini rejected the request.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    /// A response with no text in it, e.g. blocked by safety filters.
    #[error("The assistant returned no answer")]
    EmptyReply,
}

impl ChatbotError {
    /// What to show in the conversation instead of an answer.
    #[must_use]
    pub fn reply_text(&self) -> String {
        match self {
            Self::MissingApiKey => MISSING_API_KEY.to_string(),
            Self::Api { message, .. } if !message.is_empty() => message.clone(),
            _ => FALLBACK_REPLY.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> Content<'a> {
    const fn text(role: Option<&'static str>, text: &'a str) -> Self {
        Self {
            role,
            parts: [Part { text }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

const fn gemini_role(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "user",
        Sender::Bot => "model",
    }
}

fn generate_request<'a>(message: &'a str, history: &'a [ChatMessage]) -> GenerateRequest<'a> {
    let mut contents: Vec<Content<'a>> = conversation_context(history)
        .iter()
        .map(|m| Content::text(Some(gemini_role(m.role)), &m.text))
        .collect();
    contents.push(Content::text(Some("user"), message));
    GenerateRequest {
        system_instruction: Content::text(None, SYSTEM_INSTRUCTION),
        contents,
    }
}

/// Text of the first candidate, its parts joined.
fn reply_of(response: GenerateResponse) -> Option<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect();
    (!text.is_empty()).then_some(text)
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Gemini client for the assistant. Cheap to clone.
#[derive(Clone)]
pub struct ChatbotClient {
    inner: Arc<ChatbotClientInner>,
}

struct ChatbotClientInner {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    endpoint: Url,
}

impl ChatbotClient {
    /// Create a new assistant client. A missing key is only reported when
    /// a question is asked.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("nongsan-client/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        let mut endpoint = config.gemini_url.clone();
        let base = endpoint.path().trim_end_matches('/').to_string();
        endpoint.set_path(&format!(
            "{base}/v1beta/models/{}:generateContent",
            config.gemini_model
        ));

        Ok(Self {
            inner: Arc::new(ChatbotClientInner {
                client: builder.build()?,
                api_key: config.gemini_api_key.clone(),
                endpoint,
            }),
        })
    }

    /// Ask a question, with the earlier messages of the conversation.
    ///
    /// # Errors
    ///
    /// Returns `ChatbotError::MissingApiKey` without a configured key, or
    /// the transport, Gemini or decoding error.
    #[instrument(skip(self, message, history), fields(history = history.len()))]
    pub async fn send(&self, message: &str, history: &[ChatMessage]) -> Result<String, ChatbotError> {
        let Some(api_key) = &self.inner.api_key else {
            return Err(ChatbotError::MissingApiKey);
        };

        let body = generate_request(message, history);
        debug!(turns = body.contents.len(), "Asking the assistant");
        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .header(API_KEY_HEADER, api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or_default();
            return Err(ChatbotError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ChatbotError::Parse(format!("Failed to parse response: {e}")))?;
        reply_of(response).ok_or(ChatbotError::EmptyReply)
    }

    /// Like [`ChatbotClient::send`], but a failure becomes the text shown in
    /// its place, so a conversation always gets an answer.
    pub async fn reply(&self, message: &str, history: &[ChatMessage]) -> String {
        match self.send(message, history).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Assistant request failed");
                e.reply_text()
            }
        }
    }
}

impl std::fmt::Debug for ChatbotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatbotClient")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("has_api_key", &self.inner.api_key.is_some())
            .finish_non_exhaustive()
    }
}
