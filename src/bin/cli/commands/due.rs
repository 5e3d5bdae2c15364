use anyhow::{Context, Result};
use chrono::Utc;

use crate::app::{short_id, App};
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &App, limit: Option<usize>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let now = Utc::now();
    let due = app
        .service
        .due_cards(now, limit)
        .context("Failed to list due cards")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&due)?);
        }
        OutputFormat::Plain => {
            if due.is_empty() {
                println!("Nothing due. Come back later.");
                return Ok(());
            }

            for item in &due {
                println!(
                    "{}  {}  {}",
                    short_id(&item.card),
                    item.card.word,
                    terminal::progress_line(&item.progress, now, use_color)
                );
            }
            println!("\n{} cards due", due.len());
        }
    }

    Ok(())
}
