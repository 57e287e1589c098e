use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::analysis::sentiment::{classify, default_lexicon};
use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::handlers::clamp_limit;
use crate::models::journal::{
    AnalyzeRequest, AnalyzeResponse, CreateJournalRequest, JournalEntry, JournalQuery,
};
use crate::AppState;

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateJournalRequest>,
) -> AppResult<(StatusCode, Json<JournalEntry>)> {
    body.validate()?;
    if body.title.trim().is_empty() || body.content.trim().is_empty() {
        return Err(AppError::Validation(
            "Title and content must not be blank".into(),
        ));
    }

    let sentiment = classify(&body.content);

    let entry = sqlx::query_as::<_, JournalEntry>(
        r#"
        INSERT INTO journal_entries (id, user_id, title, content, sentiment)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.content)
    .bind(sentiment)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        user_id = %auth_user.id,
        entry_id = %entry.id,
        sentiment = sentiment.as_str(),
        "Journal entry saved"
    );

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<JournalQuery>,
) -> AppResult<Json<Vec<JournalEntry>>> {
    let pattern = query.q.as_deref().and_then(search_pattern);

    let entries = sqlx::query_as::<_, JournalEntry>(
        r#"
        SELECT * FROM journal_entries
        WHERE user_id = $1
          AND ($2::text IS NULL OR title ILIKE $2 OR content ILIKE $2)
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(auth_user.id)
    .bind(pattern)
    .bind(clamp_limit(query.limit))
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

/// Score text without saving it, so the editor can preview the label.
pub async fn analyze(
    Extension(_auth_user): Extension<AuthUser>,
    Json(body): Json<AnalyzeRequest>,
) -> AppResult<Json<AnalyzeResponse>> {
    body.validate()?;
    let score = default_lexicon().score(&body.content);
    Ok(Json(AnalyzeResponse {
        sentiment: score.sentiment(),
        positive: score.positive,
        negative: score.negative,
    }))
}

/// Case-insensitive "contains" pattern for ILIKE, with LIKE wildcards escaped.
fn search_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_pattern_blank_means_no_filter() {
        assert_eq!(search_pattern(""), None);
        assert_eq!(search_pattern("   "), None);
    }

    #[test]
    fn test_search_pattern_wraps_and_trims() {
        assert_eq!(search_pattern(" morning walk "), Some("%morning walk%".into()));
    }

    #[test]
    fn test_search_pattern_escapes_wildcards() {
        assert_eq!(search_pattern("100%"), Some(r"%100\%%".into()));
        assert_eq!(search_pattern("a_b"), Some(r"%a\_b%".into()));
        assert_eq!(search_pattern(r"c:\x"), Some(r"%c:\\x%".into()));
    }

    #[test]
    fn test_create_request_requires_fields() {
        let missing = serde_json::from_str::<CreateJournalRequest>(r#"{"title":"t"}"#);
        assert!(missing.is_err());

        let empty: CreateJournalRequest =
            serde_json::from_str(r#"{"title":"","content":"x"}"#).unwrap();
        assert!(empty.validate().is_err());
    }
}
