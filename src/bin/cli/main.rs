mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kertaus-cli", about = "Spaced repetition flashcards", version)]
struct Cli {
    /// Data directory (default: $KERTAUS_DATA_DIR or the platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Add a card to the catalog
    Add {
        /// The word to learn
        word: String,
        /// Definition shown on the back of the card
        #[arg(long, default_value = "")]
        definition: String,
        /// Translation as LANG=MEANING (repeatable)
        #[arg(long = "translation", short = 't', value_parser = parse_translation)]
        translations: Vec<(String, String)>,
    },

    /// List all cards
    Cards,

    /// Show a card with its progress
    Show {
        /// Card id (or unique prefix) or word
        card: String,
    },

    /// List cards due for review
    Due {
        /// Maximum number of cards (default: review.due_limit from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Grade a review of a card
    Review {
        /// Card id (or unique prefix) or word
        card: String,
        /// Answer quality, 0 (blackout) to 5 (perfect)
        #[arg(allow_negative_numbers = true)]
        quality: i32,
    },

    /// Show aggregate statistics
    Stats,

    /// List the hardest cards first
    Hardest {
        /// Maximum number of cards
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show the interval each answer quality would schedule
    Preview {
        /// Card id (or unique prefix) or word
        card: String,
    },

    /// Run the HTTP API
    Serve {
        /// Listen address (default: server.bind from config)
        #[arg(long)]
        bind: Option<String>,
    },
}

fn parse_translation(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((lang, meaning)) if !lang.trim().is_empty() => {
            Ok((lang.trim().to_string(), meaning.trim().to_string()))
        }
        _ => Err(format!("expected LANG=MEANING, got '{}'", raw)),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(cli.data_dir)?;

    match cli.command {
        Command::Add { word, definition, translations } => {
            commands::add::run(&app, word, definition, translations, &cli.format)?;
        }
        Command::Cards => {
            commands::cards::run(&app, &cli.format)?;
        }
        Command::Show { card } => {
            commands::show::run(&app, &card, &cli.format, use_color)?;
        }
        Command::Due { limit } => {
            let limit = limit.or(app.config.review.due_limit);
            commands::due::run(&app, limit, &cli.format, use_color)?;
        }
        Command::Review { card, quality } => {
            commands::review::run(&app, &card, quality, &cli.format, use_color)?;
        }
        Command::Stats => {
            commands::stats::run(&app, &cli.format)?;
        }
        Command::Hardest { limit } => {
            commands::hardest::run(&app, limit, &cli.format, use_color)?;
        }
        Command::Preview { card } => {
            commands::preview::run(&app, &card, &cli.format)?;
        }
        Command::Serve { bind } => {
            let mut config = app.config.clone();
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let runtime = tokio::runtime::Runtime::new()
                .context("Failed to start async runtime")?;
            runtime
                .block_on(kertaus_lib::server::serve(app.into_service(), &config))
                .context("Review API failed")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_parse_translation() {
        assert_eq!(
            parse_translation("en=cat"),
            Ok(("en".to_string(), "cat".to_string()))
        );
        assert_eq!(
            parse_translation(" tr = kedi "),
            Ok(("tr".to_string(), "kedi".to_string()))
        );
        assert!(parse_translation("cat").is_err());
        assert!(parse_translation("=cat").is_err());
    }

    #[test]
    fn test_cli_parses_negative_quality() {
        let cli = Cli::try_parse_from(["kertaus-cli", "review", "kissa", "-2"]).unwrap();
        match cli.command {
            Command::Review { card, quality } => {
                assert_eq!(card, "kissa");
                assert_eq!(quality, -2);
            }
            _ => panic!("expected review command"),
        }
    }

    #[test]
    fn test_server_error_takes_context() {
        let result: std::result::Result<(), kertaus_lib::server::ServerError> =
            Err(std::io::Error::other("address in use").into());
        let err = result.context("Review API failed").unwrap_err();
        assert_eq!(format!("{:#}", err), "Review API failed: IO error: address in use");
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
