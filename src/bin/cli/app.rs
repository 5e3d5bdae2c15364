use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use kertaus_lib::config::{self, Config};
use kertaus_lib::flashcards::{Flashcard, StudyService};

/// Shared application state for CLI commands
pub struct App {
    pub data_dir: PathBuf,
    pub config: Config,
    pub service: StudyService,
}

impl App {
    /// Open the data directory (explicit, or the default one)
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => config::default_data_dir().context("Failed to get data directory")?,
        };

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = Config::load(&data_dir).context("Failed to load config.toml")?;
        let service = StudyService::open(&data_dir);
        log::debug!("Using data directory {:?}", data_dir);

        Ok(Self {
            data_dir,
            config,
            service,
        })
    }

    pub fn into_service(self) -> StudyService {
        self.service
    }

    /// Find a card by word (case-insensitive) or by id prefix
    pub fn find_card(&self, query: &str) -> Result<Flashcard> {
        let cards = self.service.list_cards().context("Failed to list cards")?;
        let query_lower = query.to_lowercase();

        // Exact word or full id first
        if let Some(card) = cards
            .iter()
            .find(|c| c.word.to_lowercase() == query_lower || c.id.to_string() == query_lower)
        {
            return Ok(card.clone());
        }

        // Id prefix
        let matches: Vec<&Flashcard> = cards
            .iter()
            .filter(|c| c.id.to_string().starts_with(&query_lower))
            .collect();

        match matches.len() {
            0 => bail!(
                "No card matching '{}' in {}",
                query,
                self.data_dir.display()
            ),
            1 => Ok(matches[0].clone()),
            _ => bail!(
                "Ambiguous card '{}'. Matches:\n{}",
                query,
                matches
                    .iter()
                    .map(|c| format!("  - {} {}", short_id(c), c.word))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }
}

/// First 8 characters of a card id, enough to address it from the CLI
pub fn short_id(card: &Flashcard) -> String {
    card.id.to_string()[..8].to_string()
}
