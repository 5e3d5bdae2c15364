use anyhow::{Context, Result};
use chrono::Utc;

use crate::app::{short_id, App};
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &App, limit: usize, format: &OutputFormat, use_color: bool) -> Result<()> {
    let cards = app
        .service
        .hardest_cards(limit)
        .context("Failed to rank cards")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards yet.");
                return Ok(());
            }

            let now = Utc::now();
            for (rank, item) in cards.iter().enumerate() {
                println!(
                    "{:>3}. {}  {}  {}",
                    rank + 1,
                    short_id(&item.card),
                    item.card.word,
                    terminal::progress_line(&item.progress, now, use_color)
                );
            }
        }
    }

    Ok(())
}
