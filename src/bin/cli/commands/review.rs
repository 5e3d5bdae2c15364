use anyhow::{Context, Result};
use chrono::Utc;

use kertaus_lib::flashcards::algorithm::format_interval;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(app: &App, query: &str, quality: i32, format: &OutputFormat, use_color: bool) -> Result<()> {
    let card = app.find_card(query)?;
    let outcome = app
        .service
        .submit_answer(card.id, quality, Utc::now())
        .context("Failed to record review")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Plain => {
            let next = outcome
                .next_review_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "now".to_string());
            println!(
                "{}: next review in {} ({}), ease {}",
                terminal::paint(&card.word, Color::BOLD, use_color),
                format_interval(outcome.new_interval),
                next,
                terminal::ease_label(outcome.new_ease_factor, use_color)
            );
        }
    }

    Ok(())
}
