//! Data models for the flashcard system

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Lowest ease factor a card can reach
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor given to every new card
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Highest answer quality on the SM-2 scale
pub const MAX_QUALITY: i32 = 5;

/// A vocabulary card in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: Uuid,
    pub word: String,
    #[serde(default)]
    pub definition: String,
    /// Meanings keyed by language code ("en", "tr", ...)
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Flashcard {
    pub fn new(word: String, definition: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            word,
            definition,
            translations: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Spaced repetition progress for a single card.
///
/// Fields are only reachable through setters that clamp into the valid
/// range, so a state never holds `interval < 1`, `repetitions < 0`,
/// `ease_factor < 1.3` or a quality outside `0..=5`. Deserialization goes
/// through the same setters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProgressRecord")]
pub struct ProgressState {
    card_id: Uuid,
    interval: i32,
    repetitions: i32,
    ease_factor: f64,
    quality: i32,
    next_review_date: Option<DateTime<Utc>>,
    last_review_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl ProgressState {
    /// Fresh progress for a card entering the system, due immediately
    pub fn new(card_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            card_id,
            interval: 1,
            repetitions: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            quality: 0,
            next_review_date: Some(now),
            last_review_date: now,
            created_at: now,
        }
    }

    pub fn card_id(&self) -> Uuid {
        self.card_id
    }

    /// Days until the next review
    pub fn interval(&self) -> i32 {
        self.interval
    }

    /// Consecutive successful reviews since the last lapse
    pub fn repetitions(&self) -> i32 {
        self.repetitions
    }

    pub fn ease_factor(&self) -> f64 {
        self.ease_factor
    }

    /// Quality of the most recent answer
    pub fn quality(&self) -> i32 {
        self.quality
    }

    pub fn next_review_date(&self) -> Option<DateTime<Utc>> {
        self.next_review_date
    }

    pub fn last_review_date(&self) -> DateTime<Utc> {
        self.last_review_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_interval(&mut self, interval: i32) {
        self.interval = interval.max(1);
    }

    pub fn set_repetitions(&mut self, repetitions: i32) {
        self.repetitions = repetitions.max(0);
    }

    /// `f64::max` discards NaN, so a NaN input also lands on the floor.
    pub fn set_ease_factor(&mut self, ease_factor: f64) {
        self.ease_factor = ease_factor.max(MIN_EASE_FACTOR);
    }

    pub fn set_quality(&mut self, quality: i32) {
        self.quality = quality.clamp(0, MAX_QUALITY);
    }

    pub fn set_next_review_date(&mut self, date: Option<DateTime<Utc>>) {
        self.next_review_date = date;
    }

    pub fn set_last_review_date(&mut self, date: DateTime<Utc>) {
        self.last_review_date = date;
    }
}

/// On-disk shape of a progress record. Every field but the card id may be
/// missing; values are routed through the clamping setters on conversion.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgressRecord {
    card_id: Uuid,
    #[serde(default = "default_interval")]
    interval: i32,
    #[serde(default)]
    repetitions: i32,
    #[serde(default = "default_ease_factor")]
    ease_factor: f64,
    #[serde(default)]
    quality: i32,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    next_review_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    last_review_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    created_at: Option<DateTime<Utc>>,
}

fn default_interval() -> i32 {
    1
}

fn default_ease_factor() -> f64 {
    DEFAULT_EASE_FACTOR
}

impl From<ProgressRecord> for ProgressState {
    fn from(record: ProgressRecord) -> Self {
        let created_at = record
            .created_at
            .or(record.last_review_date)
            .unwrap_or_else(Utc::now);

        let mut state = ProgressState::new(record.card_id, created_at);
        state.set_interval(record.interval);
        state.set_repetitions(record.repetitions);
        state.set_ease_factor(record.ease_factor);
        state.set_quality(record.quality);
        state.set_next_review_date(record.next_review_date);
        state.set_last_review_date(record.last_review_date.unwrap_or(created_at));
        state
    }
}

/// Parse a stored timestamp: RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare
/// `YYYY-MM-DD` (read as midnight UTC).
pub(crate) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) => parse_timestamp(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", value))),
    }
}

/// Aggregate statistics over a set of progress records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_cards: usize,
    pub due_cards: usize,
    pub new_cards: usize,
    pub total_repetitions: u64,
    pub average_ease_factor: f64,
    pub average_interval: f64,
    /// Repetitions against an assumed ten per card, as a percentage.
    /// Not clamped, so it can exceed 100.
    pub completion_rate: f64,
}

/// A card joined with its progress, used for review sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardWithProgress {
    pub card: Flashcard,
    pub progress: ProgressState,
}
