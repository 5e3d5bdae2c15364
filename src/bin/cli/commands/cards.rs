use anyhow::{Context, Result};

use crate::app::{short_id, App};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let cards = app.service.list_cards().context("Failed to list cards")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards yet. Add one with `kertaus-cli add <word>`.");
                return Ok(());
            }

            let max_word_len = cards.iter().map(|c| c.word.chars().count()).max().unwrap_or(4).max(4);

            println!("{:<8}  {:<width$}  Definition", "Id", "Word", width = max_word_len);
            println!("{}  {}  {}", "\u{2500}".repeat(8), "\u{2500}".repeat(max_word_len), "\u{2500}".repeat(10));

            for card in &cards {
                println!(
                    "{}  {:<width$}  {}",
                    short_id(card),
                    card.word,
                    card.definition,
                    width = max_word_len
                );
            }

            println!("\n{} cards total", cards.len());
        }
    }

    Ok(())
}
