//! Storage for the card catalog and review progress
//!
//! Directory layout:
//! ```text
//! {data-dir}/
//! ├── cards.json      # Array of all flashcards
//! └── progress.json   # Array of progress records, one per card
//! ```
//!
//! Both files are rewritten whole on every change, through a `.tmp`
//! sibling and a rename, so a crash never leaves a half-written file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::models::*;

#[derive(Error, Debug)]
pub enum FlashcardStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    #[error("Progress not found for card: {0}")]
    ProgressNotFound(Uuid),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, FlashcardStorageError>;

/// Load-all / save-all persistence for progress records.
///
/// Implementations do no locking of their own; callers serialize
/// read-modify-write cycles.
pub trait ProgressStore: Send {
    fn load_all(&self) -> Result<Vec<ProgressState>>;

    /// Replace the whole collection in one step
    fn save_all(&self, states: &[ProgressState]) -> Result<()>;

    /// Look up the progress for a card
    fn find(&self, card_id: Uuid) -> Result<ProgressState> {
        self.load_all()?
            .into_iter()
            .find(|s| s.card_id() == card_id)
            .ok_or(FlashcardStorageError::ProgressNotFound(card_id))
    }
}

fn read_json_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&content)?)
}

/// Write using atomic replace (write to .tmp then rename)
fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Progress kept in a single `progress.json` array
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("progress.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressStore for JsonProgressStore {
    fn load_all(&self) -> Result<Vec<ProgressState>> {
        let states: Vec<ProgressState> = read_json_array(&self.path)?;
        log::debug!("Loaded {} progress records from {:?}", states.len(), self.path);
        Ok(states)
    }

    fn save_all(&self, states: &[ProgressState]) -> Result<()> {
        write_json_atomic(&self.path, states)?;
        log::debug!("Saved {} progress records to {:?}", states.len(), self.path);
        Ok(())
    }
}

/// Progress held in memory, for tests and embedding
#[derive(Default)]
pub struct MemoryProgressStore {
    states: Mutex<Vec<ProgressState>>,
}

impl MemoryProgressStore {
    pub fn new(states: Vec<ProgressState>) -> Self {
        Self {
            states: Mutex::new(states),
        }
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load_all(&self) -> Result<Vec<ProgressState>> {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        Ok(states.clone())
    }

    fn save_all(&self, states: &[ProgressState]) -> Result<()> {
        let mut guard = self.states.lock().unwrap_or_else(|e| e.into_inner());
        *guard = states.to_vec();
        Ok(())
    }
}

/// Card catalog kept in `cards.json`
pub struct CardCatalog {
    path: PathBuf,
}

impl CardCatalog {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("cards.json"),
        }
    }

    /// List all cards in insertion order
    pub fn list_cards(&self) -> Result<Vec<Flashcard>> {
        read_json_array(&self.path)
    }

    /// Get a specific card
    pub fn get_card(&self, card_id: Uuid) -> Result<Flashcard> {
        self.list_cards()?
            .into_iter()
            .find(|c| c.id == card_id)
            .ok_or(FlashcardStorageError::CardNotFound(card_id))
    }

    /// Append a card to the catalog
    pub fn add_card(&self, card: &Flashcard) -> Result<()> {
        if card.word.trim().is_empty() {
            return Err(FlashcardStorageError::InvalidInput(
                "word must not be empty".to_string(),
            ));
        }

        let mut cards = self.list_cards()?;
        cards.push(card.clone());
        write_json_atomic(&self.path, &cards)
    }
}
