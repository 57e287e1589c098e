use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, FixedOffset, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::analysis::mood_series::{build_series, MoodSeriesPoint, SeriesOptions, SeriesWindow};
use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::handlers::clamp_limit;
use crate::models::mood::{
    CreateMoodRequest, MoodEntry, MoodQuery, MoodSeriesResponse, SeriesFromEntriesRequest,
    SeriesQuery,
};
use crate::AppState;

const DEFAULT_SERIES_DAYS: i64 = 30;
const MAX_SERIES_DAYS: i64 = 366;
const MAX_OFFSET_MINUTES: i32 = 14 * 60;
const MAX_CLIENT_ENTRIES: usize = 10_000;

pub async fn create_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateMoodRequest>,
) -> AppResult<(StatusCode, Json<MoodEntry>)> {
    body.validate()?;

    let note = body
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, mood, note)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.mood)
    .bind(note)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(user_id = %auth_user.id, entry_id = %entry.id, mood = entry.mood, "Mood logged");

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn list_moods(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodQuery>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2
        "#,
    )
    .bind(auth_user.id)
    .bind(clamp_limit(query.limit))
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

/// Chart series over the caller's stored entries.
pub async fn get_series(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<SeriesQuery>,
) -> AppResult<Json<MoodSeriesResponse>> {
    let params = SeriesParams::resolve(&query, Utc::now())?;
    let (from, to) = params
        .window
        .utc_bounds(params.options.utc_offset)
        .ok_or_else(|| AppError::Validation("Series window is out of range".into()))?;

    // Newest first, the order the store hands entries back in.
    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(from)
    .bind(to)
    .fetch_all(&state.db)
    .await?;

    let points = build_series(
        &entries,
        params.window.end(),
        params.window.days(),
        &params.options,
    )?;
    Ok(Json(params.into_response(points)))
}

/// Chart series over entries the client already holds.
pub async fn series_from_entries(
    Extension(_auth_user): Extension<AuthUser>,
    Json(body): Json<SeriesFromEntriesRequest>,
) -> AppResult<Json<MoodSeriesResponse>> {
    if body.entries.len() > MAX_CLIENT_ENTRIES {
        return Err(AppError::Validation(format!(
            "At most {MAX_CLIENT_ENTRIES} entries can be charted at once"
        )));
    }
    let params = SeriesParams::resolve(&body.window, Utc::now())?;
    let points = build_series(
        &body.entries,
        params.window.end(),
        params.window.days(),
        &params.options,
    )?;
    Ok(Json(params.into_response(points)))
}

#[derive(Debug)]
struct SeriesParams {
    window: SeriesWindow,
    options: SeriesOptions,
}

impl SeriesParams {
    fn resolve(query: &SeriesQuery, now: DateTime<Utc>) -> AppResult<Self> {
        let minutes = query.tz_offset_minutes.unwrap_or(0);
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&minutes) {
            return Err(AppError::Validation(
                "tz_offset_minutes must be within ±840".into(),
            ));
        }
        let utc_offset = FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| AppError::Validation("Invalid tz_offset_minutes".into()))?;

        let days = query.days.unwrap_or(DEFAULT_SERIES_DAYS);
        if days > MAX_SERIES_DAYS {
            return Err(AppError::Validation(format!(
                "days must be at most {MAX_SERIES_DAYS}"
            )));
        }
        let end = query
            .end
            .unwrap_or_else(|| now.with_timezone(&utc_offset).date_naive());
        let window = SeriesWindow::new(end, days)?;

        Ok(Self {
            window,
            options: SeriesOptions {
                utc_offset,
                same_day: query.same_day.unwrap_or_default(),
            },
        })
    }

    fn into_response(self, points: Vec<MoodSeriesPoint>) -> MoodSeriesResponse {
        MoodSeriesResponse {
            window_start: self.window.start(),
            window_end: self.window.end(),
            days: self.window.days(),
            same_day: self.options.same_day,
            points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::mood_series::SameDayPolicy;
    use chrono::NaiveDate;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-10T22:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_defaults() {
        let params = SeriesParams::resolve(&SeriesQuery::default(), now()).unwrap();
        assert_eq!(params.window.days(), 30);
        assert_eq!(params.window.end(), NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(params.options.same_day, SameDayPolicy::First);
    }

    #[test]
    fn test_default_end_follows_offset() {
        let query = SeriesQuery {
            tz_offset_minutes: Some(120),
            ..SeriesQuery::default()
        };
        let params = SeriesParams::resolve(&query, now()).unwrap();
        // 22:30 UTC is already the next day at UTC+02:00.
        assert_eq!(params.window.end(), NaiveDate::from_ymd_opt(2024, 1, 11).unwrap());
    }

    #[test]
    fn test_rejects_bad_windows() {
        for days in [0, -1, MAX_SERIES_DAYS + 1] {
            let query = SeriesQuery {
                days: Some(days),
                ..SeriesQuery::default()
            };
            assert!(matches!(
                SeriesParams::resolve(&query, now()),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_rejects_bad_offset() {
        for minutes in [15 * 60, -15 * 60, i32::MIN, i32::MAX] {
            let query = SeriesQuery {
                tz_offset_minutes: Some(minutes),
                ..SeriesQuery::default()
            };
            assert!(
                matches!(
                    SeriesParams::resolve(&query, now()),
                    Err(AppError::Validation(_))
                ),
                "{minutes}"
            );
        }
    }

    #[test]
    fn test_accepts_offset_edges() {
        for minutes in [-MAX_OFFSET_MINUTES, MAX_OFFSET_MINUTES] {
            let query = SeriesQuery {
                tz_offset_minutes: Some(minutes),
                ..SeriesQuery::default()
            };
            let params = SeriesParams::resolve(&query, now()).unwrap();
            assert_eq!(params.options.utc_offset.local_minus_utc(), minutes * 60);
        }
    }

    #[test]
    fn test_response_carries_window() {
        let query = SeriesQuery {
            days: Some(3),
            end: NaiveDate::from_ymd_opt(2024, 1, 10),
            same_day: Some(SameDayPolicy::Latest),
            ..SeriesQuery::default()
        };
        let params = SeriesParams::resolve(&query, now()).unwrap();
        let response = params.into_response(vec![]);
        assert_eq!(response.window_start, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(response.days, 3);
        assert_eq!(response.same_day, SameDayPolicy::Latest);
    }
}
