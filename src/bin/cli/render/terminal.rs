use chrono::{DateTime, Utc};

use kertaus_lib::flashcards::ProgressState;

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Wrap text in a color when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

/// Calendar date of the next review, or "now" when unset
pub fn next_review_label(state: &ProgressState) -> String {
    state
        .next_review_date()
        .map(|d| d.date_naive().to_string())
        .unwrap_or_else(|| "now".to_string())
}

/// Color an ease factor by how hard the card is
pub fn ease_label(ease_factor: f64, use_color: bool) -> String {
    let text = format!("{:.2}", ease_factor);
    let color = if ease_factor < 1.8 {
        Color::RED
    } else if ease_factor < 2.3 {
        Color::YELLOW
    } else {
        Color::GREEN
    };
    paint(&text, color, use_color)
}

/// One-line progress summary used by several commands
pub fn progress_line(state: &ProgressState, now: DateTime<Utc>, use_color: bool) -> String {
    let due = if kertaus_lib::flashcards::algorithm::is_due(state, now) {
        paint("due", Color::BOLD, use_color)
    } else {
        paint(&next_review_label(state), Color::DIM, use_color)
    };
    format!(
        "interval {}d  reps {}  ease {}  next {}",
        state.interval(),
        state.repetitions(),
        ease_label(state.ease_factor(), use_color),
        due
    )
}
