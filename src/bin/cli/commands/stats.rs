use anyhow::{Context, Result};
use chrono::Utc;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let stats = app
        .service
        .statistics(Utc::now())
        .context("Failed to compute statistics")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Plain => {
            println!("Total cards:        {}", stats.total_cards);
            println!("Due now:            {}", stats.due_cards);
            println!("New:                {}", stats.new_cards);
            println!("Total repetitions:  {}", stats.total_repetitions);
            println!("Average ease:       {:.2}", stats.average_ease_factor);
            println!("Average interval:   {:.2} days", stats.average_interval);
            println!("Completion:         {:.2}%", stats.completion_rate);
        }
    }

    Ok(())
}
