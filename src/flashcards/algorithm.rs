//! SM-2 Spaced Repetition Algorithm
//!
//! Implementation of the SuperMemo 2 update rule for calculating review
//! intervals from graded recall, plus the due check and aggregate
//! statistics over a collection of progress records.
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but the answer felt familiar
//! - 2: Incorrect, but the answer was remembered on seeing it
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation
//!
//! Every function takes the reference instant explicitly; nothing here
//! reads the wall clock.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::models::{ProgressState, ReviewStats, MAX_QUALITY, MIN_EASE_FACTOR};

/// Answers graded below this are lapses
pub const PASSING_QUALITY: i32 = 3;

/// Repetitions per card treated as full completion in the statistics
const MASTERY_REPETITIONS: f64 = 10.0;

/// Summary of a review, shaped for API and CLI output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    pub next_review_date: Option<NaiveDate>,
    pub new_interval: i32,
    /// Rounded to two decimals
    pub new_ease_factor: f64,
}

impl ReviewOutcome {
    pub fn from_state(state: &ProgressState) -> Self {
        Self {
            next_review_date: state.next_review_date().map(|d| d.date_naive()),
            new_interval: state.interval(),
            new_ease_factor: round2(state.ease_factor()),
        }
    }
}

/// Apply one graded review and return the resulting progress.
///
/// The ease factor is recomputed from the pre-review values first; the
/// interval growth for mature cards then uses the updated ease factor.
pub fn review(state: &ProgressState, quality: i32, now: DateTime<Utc>) -> ProgressState {
    let quality = quality.clamp(0, MAX_QUALITY);
    let mut next = state.clone();

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let miss = f64::from(MAX_QUALITY - quality);
    let ease_factor = state.ease_factor() + (0.1 - miss * (0.08 + miss * 0.02));
    next.set_ease_factor(ease_factor.max(MIN_EASE_FACTOR));

    let (interval, repetitions) = if quality < PASSING_QUALITY {
        // A lapse throws away all scheduling progress
        (1, 0)
    } else {
        let interval = match state.repetitions() {
            0 => 1,
            1 => 3,
            _ => (f64::from(state.interval()) * next.ease_factor()).floor() as i32,
        };
        (interval, state.repetitions().saturating_add(1))
    };

    next.set_interval(interval);
    next.set_repetitions(repetitions);
    next.set_quality(quality);
    next.set_last_review_date(now);
    next.set_next_review_date(Some(add_days(now, interval)));

    next
}

fn add_days(now: DateTime<Utc>, days: i32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whether a card should be shown. A state without a next review date is
/// always due; the boundary is inclusive.
pub fn is_due(state: &ProgressState, now: DateTime<Utc>) -> bool {
    match state.next_review_date() {
        None => true,
        Some(next) => now >= next,
    }
}

pub fn due_count(states: &[ProgressState], now: DateTime<Utc>) -> usize {
    states.iter().filter(|s| is_due(s, now)).count()
}

/// Cards that have never been answered correctly since their last reset
pub fn new_count(states: &[ProgressState]) -> usize {
    states.iter().filter(|s| s.repetitions() == 0).count()
}

/// Fold a collection of progress records into summary statistics.
/// An empty collection yields all zeros.
pub fn compute_statistics(states: &[ProgressState], now: DateTime<Utc>) -> ReviewStats {
    let total_cards = states.len();
    if total_cards == 0 {
        return ReviewStats::default();
    }

    let total_repetitions: u64 = states.iter().map(|s| s.repetitions() as u64).sum();
    let ease_sum: f64 = states.iter().map(|s| s.ease_factor()).sum();
    let interval_sum: f64 = states.iter().map(|s| f64::from(s.interval())).sum();
    let count = total_cards as f64;

    ReviewStats {
        total_cards,
        due_cards: due_count(states, now),
        new_cards: new_count(states),
        total_repetitions,
        average_ease_factor: round2(ease_sum / count),
        average_interval: round2(interval_sum / count),
        completion_rate: round2(total_repetitions as f64 / (count * MASTERY_REPETITIONS) * 100.0),
    }
}

/// Order states hardest first: ascending ease factor, then the longest
/// since last review. The sort is stable and the input is left untouched.
pub fn sort_by_difficulty(states: &[ProgressState]) -> Vec<ProgressState> {
    let mut sorted = states.to_vec();
    sorted.sort_by(|a, b| {
        a.ease_factor()
            .total_cmp(&b.ease_factor())
            .then_with(|| a.last_review_date().cmp(&b.last_review_date()))
    });
    sorted
}

/// Interval each quality grade (0 through 5) would produce.
/// Used to show users what an answer would schedule before they give it.
pub fn preview_intervals(state: &ProgressState, now: DateTime<Utc>) -> [i32; 6] {
    let mut intervals = [0; 6];
    for (quality, slot) in intervals.iter_mut().enumerate() {
        *slot = review(state, quality as i32, now).interval();
    }
    intervals
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: i32) -> String {
    if days <= 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
