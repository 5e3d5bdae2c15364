use anyhow::{Context, Result};
use chrono::Utc;

use kertaus_lib::flashcards::algorithm::format_interval;

use crate::app::App;
use crate::OutputFormat;

const QUALITY_LABELS: [&str; 6] = [
    "blackout",
    "wrong, familiar",
    "wrong, remembered",
    "hard",
    "good",
    "easy",
];

pub fn run(app: &App, query: &str, format: &OutputFormat) -> Result<()> {
    let card = app.find_card(query)?;
    let intervals = app
        .service
        .preview(card.id, Utc::now())
        .context("Failed to preview intervals")?;

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = intervals
                .iter()
                .enumerate()
                .map(|(quality, days)| {
                    serde_json::json!({
                        "quality": quality,
                        "interval": days,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", card.word);
            for (quality, days) in intervals.iter().enumerate() {
                println!(
                    "  {} {:<18} {}",
                    quality,
                    QUALITY_LABELS[quality],
                    format_interval(*days)
                );
            }
        }
    }

    Ok(())
}
