use anyhow::{Context, Result};
use chrono::Utc;

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(app: &App, query: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let card = app.find_card(query)?;
    let progress = app
        .service
        .get_progress(card.id)
        .context("Failed to load progress")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "card": card,
                "progress": progress,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", terminal::paint(&card.word, Color::BOLD, use_color));
            if !card.definition.is_empty() {
                println!("{}", card.definition);
            }
            for (lang, meaning) in &card.translations {
                println!("  {}: {}", terminal::paint(lang, Color::CYAN, use_color), meaning);
            }
            println!();
            println!("{}", terminal::progress_line(&progress, Utc::now(), use_color));
            println!(
                "last reviewed {}  last quality {}",
                progress.last_review_date().format("%Y-%m-%d %H:%M"),
                progress.quality()
            );
            println!("{}", terminal::paint(&format!("id {}", card.id), Color::DIM, use_color));
        }
    }

    Ok(())
}
