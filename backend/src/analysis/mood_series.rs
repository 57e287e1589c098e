//! Day-bucketed mood history for charting.
//!
//! [`build_series`] turns a sparse list of mood samples into exactly one point
//! per calendar day over a trailing window. Days without a usable sample carry
//! `mood: None` so the chart draws a gap instead of a false low.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::mood::{MoodEntry, MoodScore};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Which sample wins when several land on the same calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameDayPolicy {
    /// First matching sample in input order.
    #[default]
    First,
    /// Last matching sample in input order.
    Last,
    /// Sample with the greatest timestamp; input order breaks exact ties.
    Latest,
}

#[derive(Debug, Clone, Copy)]
pub struct SeriesOptions {
    pub utc_offset: FixedOffset,
    pub same_day: SameDayPolicy,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            same_day: SameDayPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodSeriesPoint {
    pub date: NaiveDate,
    pub label: String,
    pub mood: Option<MoodScore>,
    pub mood_label: Option<&'static str>,
}

/// Anything that can be charted. Returning `None` from either method marks the
/// sample as malformed; it is skipped rather than failing the whole series.
pub trait MoodSample {
    fn recorded_at(&self) -> Option<DateTime<Utc>>;
    fn mood(&self) -> Option<MoodScore>;
}

impl MoodSample for MoodEntry {
    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        Some(self.timestamp)
    }

    fn mood(&self) -> Option<MoodScore> {
        MoodScore::new(self.mood)
    }
}

/// Loosely-typed mood record as a client holds it (RFC 3339 timestamp string,
/// untyped score). Missing fields deserialize to empty values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMoodRecord {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub mood: serde_json::Value,
}

impl MoodSample for RawMoodRecord {
    fn recorded_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn mood(&self) -> Option<MoodScore> {
        self.mood
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .and_then(MoodScore::new)
    }
}

/// Inclusive run of `days` calendar days ending on `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesWindow {
    start: NaiveDate,
    end: NaiveDate,
    days: i64,
}

impl SeriesWindow {
    pub fn new(end: NaiveDate, days: i64) -> Result<Self, SeriesError> {
        if days <= 0 {
            return Err(SeriesError::InvalidArgument(format!(
                "window_days must be positive, got {days}"
            )));
        }
        let start = end
            .checked_sub_days(Days::new((days - 1) as u64))
            .ok_or_else(|| {
                SeriesError::InvalidArgument(format!(
                    "a {days}-day window ending {end} is out of range"
                ))
            })?;
        Ok(Self { start, end, days })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// UTC instants covering the window in the given local offset, as a
    /// half-open range `[from, to)`.
    pub fn utc_bounds(&self, offset: FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let from = offset
            .from_local_datetime(&self.start.and_time(NaiveTime::MIN))
            .single()?;
        let to = offset
            .from_local_datetime(&self.end.succ_opt()?.and_time(NaiveTime::MIN))
            .single()?;
        Some((from.with_timezone(&Utc), to.with_timezone(&Utc)))
    }
}

/// Build the gap-filled series for the `window_days` days ending on `window_end`.
///
/// The input is never mutated and the result depends only on the arguments.
pub fn build_series<S: MoodSample>(
    samples: &[S],
    window_end: NaiveDate,
    window_days: i64,
    options: &SeriesOptions,
) -> Result<Vec<MoodSeriesPoint>, SeriesError> {
    let window = SeriesWindow::new(window_end, window_days)?;

    let mut picked: HashMap<NaiveDate, (MoodScore, DateTime<Utc>)> = HashMap::new();
    let mut skipped = 0usize;

    for sample in samples {
        let (Some(at), Some(mood)) = (sample.recorded_at(), sample.mood()) else {
            skipped += 1;
            continue;
        };
        let day = at.with_timezone(&options.utc_offset).date_naive();
        if !window.contains(day) {
            continue;
        }

        match picked.entry(day) {
            Entry::Vacant(slot) => {
                slot.insert((mood, at));
            }
            Entry::Occupied(mut slot) => match options.same_day {
                SameDayPolicy::First => {}
                SameDayPolicy::Last => {
                    slot.insert((mood, at));
                }
                SameDayPolicy::Latest => {
                    if at > slot.get().1 {
                        slot.insert((mood, at));
                    }
                }
            },
        }
    }

    if skipped > 0 {
        tracing::debug!(
            skipped,
            total = samples.len(),
            "Skipped mood samples with unusable timestamp or score"
        );
    }

    let points = window
        .start()
        .iter_days()
        .take(window.days() as usize)
        .map(|date| {
            let mood = picked.get(&date).map(|(mood, _)| *mood);
            MoodSeriesPoint {
                date,
                label: date.format("%b %d").to_string(),
                mood,
                mood_label: mood.map(MoodScore::label),
            }
        })
        .collect();

    Ok(points)
}
