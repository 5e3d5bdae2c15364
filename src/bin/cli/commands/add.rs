use anyhow::{Context, Result};
use chrono::Utc;

use crate::app::{short_id, App};
use crate::OutputFormat;

pub fn run(
    app: &App,
    word: String,
    definition: String,
    translations: Vec<(String, String)>,
    format: &OutputFormat,
) -> Result<()> {
    let card = app
        .service
        .create_card(word, definition, translations.into_iter().collect(), Utc::now())
        .context("Failed to create card")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => {
            println!("Created card {} ({})", short_id(&card), card.word);
        }
    }

    Ok(())
}
