//! Model-provider client behind the chat proxy.
//!
//! Handlers depend on the [`ModelClient`] trait; production wires in
//! [`ClaudeClient`] (Anthropic Messages API).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

const SYSTEM_PROMPT: &str = "You are LifeLine, a warm and supportive wellness companion. \
Listen carefully, respond with empathy, and keep answers short and practical. \
You are not a therapist and do not diagnose. If the user mentions self-harm or \
being in danger, encourage them to contact a crisis line such as 988 (US), \
Samaritans 116 123 (UK) or local emergency services right away.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model provider is not configured")]
    NotConfigured,

    #[error("model provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model provider declined to answer")]
    Refused,

    #[error("model provider response was malformed: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, history: &[ChatTurn], message: &str) -> Result<String, ModelError>;
}

pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_key: config.claude_api_key.clone(),
            model: config.claude_model.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl ModelClient for ClaudeClient {
    async fn generate(&self, history: &[ChatTurn], message: &str) -> Result<String, ModelError> {
        if self.api_key.is_empty() {
            return Err(ModelError::NotConfigured);
        }

        let messages = conversation(history, message);
        let response = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&serde_json::json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "system": SYSTEM_PROMPT,
                "messages": messages,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        let parsed: MessagesResponse = response.json().await?;
        extract_text(parsed)
    }
}

/// Shape history plus the new message into a valid Messages API conversation:
/// it must open with a user turn, roles must alternate, and blank turns are
/// dropped. Adjacent turns from the same role are merged.
pub fn conversation(history: &[ChatTurn], message: &str) -> Vec<ChatTurn> {
    let mut turns: Vec<ChatTurn> = Vec::with_capacity(history.len() + 1);
    let incoming = history.iter().cloned().chain(std::iter::once(ChatTurn {
        role: ChatRole::User,
        content: message.to_string(),
    }));

    for turn in incoming {
        let content = turn.content.trim();
        if content.is_empty() {
            continue;
        }
        // Greeting bubbles shown by the client come before any user input.
        if turns.is_empty() && turn.role == ChatRole::Assistant {
            continue;
        }
        match turns.last_mut() {
            Some(last) if last.role == turn.role => {
                last.content.push_str("\n\n");
                last.content.push_str(content);
            }
            _ => turns.push(ChatTurn {
                role: turn.role,
                content: content.to_string(),
            }),
        }
    }
    turns
}

fn extract_text(response: MessagesResponse) -> Result<String, ModelError> {
    if response.stop_reason.as_deref() == Some("refusal") {
        return Err(ModelError::Refused);
    }
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");
    if text.trim().is_empty() {
        return Err(ModelError::Malformed("no text content".into()));
    }
    Ok(text)
}
