use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::llm::{ChatTurn, ModelError};
use crate::AppState;

const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(length(max = 50, message = "History is limited to 50 messages"))]
    pub history: Vec<ChatTurn>,

    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,
}

impl ChatRequest {
    /// Every prior turn is held to the same length as a new message.
    fn check_history(&self) -> AppResult<()> {
        match self
            .history
            .iter()
            .position(|turn| turn.content.chars().count() > MAX_MESSAGE_CHARS)
        {
            Some(i) => Err(AppError::Validation(format!(
                "history[{i}]: Message must be at most {MAX_MESSAGE_CHARS} characters"
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub text: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    body.validate()?;
    body.check_history()?;
    let message = body.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message must not be blank".into()));
    }

    match state.chat.generate(&body.history, message).await {
        Ok(text) => Ok(Json(ChatResponse { text })),
        Err(ModelError::NotConfigured) => {
            tracing::warn!("Chat requested but no model API key is configured");
            Err(AppError::NotConfigured("Chat"))
        }
        Err(e) => {
            tracing::warn!(user_id = %auth_user.id, error = %e, "Model provider call failed");
            Err(AppError::Upstream)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_defaults_to_empty() {
        let req: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(req.history.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_oversized_history_rejected() {
        let history: Vec<_> = (0..51)
            .map(|i| serde_json::json!({"role": "user", "content": format!("m{i}")}))
            .collect();
        let req: ChatRequest =
            serde_json::from_value(serde_json::json!({"history": history, "message": "hi"}))
                .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_oversized_history_turn_rejected() {
        let long = "a".repeat(MAX_MESSAGE_CHARS + 1);
        let req: ChatRequest = serde_json::from_value(serde_json::json!({
            "history": [
                {"role": "user", "content": "hello"},
                {"role": "assistant", "content": long},
            ],
            "message": "hi",
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        match req.check_history() {
            Err(AppError::Validation(msg)) => assert!(msg.starts_with("history[1]")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_history_turn_at_limit_accepted() {
        // multi-byte chars count once
        let at_limit = "é".repeat(MAX_MESSAGE_CHARS);
        let req: ChatRequest = serde_json::from_value(serde_json::json!({
            "history": [{"role": "user", "content": at_limit}],
            "message": "hi",
        }))
        .unwrap();
        assert!(req.check_history().is_ok());
    }
}
