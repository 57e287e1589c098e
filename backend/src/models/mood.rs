use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::analysis::mood_series::{MoodSeriesPoint, RawMoodRecord, SameDayPolicy};

/// Self-reported mood on a 1 (terrible) to 5 (excellent) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct MoodScore(u8);

#[derive(Debug, thiserror::Error)]
#[error("mood must be between 1 and 5, got {0}")]
pub struct InvalidMoodScore(pub i64);

impl MoodScore {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    pub fn new(value: i32) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then_some(Self(value as u8))
    }

    pub fn value(self) -> i32 {
        i32::from(self.0)
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            5 => "Excellent",
            4 => "Good",
            3 => "Okay",
            2 => "Bad",
            _ => "Terrible",
        }
    }
}

impl TryFrom<i32> for MoodScore {
    type Error = InvalidMoodScore;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidMoodScore(i64::from(value)))
    }
}

impl From<MoodScore> for i32 {
    fn from(score: MoodScore) -> Self {
        score.value()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: i32,
    pub note: Option<String>,
    #[sqlx(rename = "created_at")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMoodRequest {
    #[validate(range(min = 1, max = 5, message = "Mood must be between 1 and 5"))]
    pub mood: i32,

    #[validate(length(max = 5000, message = "Note must be under 5000 characters"))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    pub limit: Option<i64>,
}

/// Window parameters shared by the stored and client-supplied series endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct SeriesQuery {
    pub days: Option<i64>,
    pub end: Option<NaiveDate>,
    pub tz_offset_minutes: Option<i32>,
    pub same_day: Option<SameDayPolicy>,
}

#[derive(Debug, Deserialize)]
pub struct SeriesFromEntriesRequest {
    #[serde(default)]
    pub entries: Vec<RawMoodRecord>,
    #[serde(flatten)]
    pub window: SeriesQuery,
}

#[derive(Debug, Serialize)]
pub struct MoodSeriesResponse {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub days: i64,
    pub same_day: SameDayPolicy,
    pub points: Vec<MoodSeriesPoint>,
}
