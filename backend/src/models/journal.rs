use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "journal_sentiment", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

/// Journal entries are append-only: sentiment is fixed when the row is written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub sentiment: Sentiment,
    #[sqlx(rename = "created_at")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJournalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 20000, message = "Content must be 1-20000 characters"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(length(max = 20000, message = "Content must be under 20000 characters"))]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub sentiment: Sentiment,
    pub positive: usize,
    pub negative: usize,
}

#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}
