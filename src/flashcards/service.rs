//! Study operations over the catalog and progress store
//!
//! Every method that depends on time takes `now` from the caller. Methods
//! that modify progress do a full load, update and save; hold the service
//! behind a lock when it is shared.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::algorithm::{self, ReviewOutcome};
use super::models::*;
use super::storage::{CardCatalog, FlashcardStorageError, JsonProgressStore, ProgressStore, Result};

pub struct StudyService {
    catalog: CardCatalog,
    progress: Box<dyn ProgressStore>,
}

impl StudyService {
    pub fn new(catalog: CardCatalog, progress: Box<dyn ProgressStore>) -> Self {
        Self { catalog, progress }
    }

    /// Open the JSON-backed catalog and progress store in a data directory
    pub fn open(data_dir: &Path) -> Self {
        Self::new(
            CardCatalog::new(data_dir),
            Box::new(JsonProgressStore::new(data_dir)),
        )
    }

    // ==================== Card Operations ====================

    /// Add a card to the catalog along with fresh progress for it.
    ///
    /// Progress is saved first; if the catalog write then fails the previous
    /// progress collection is put back, so no card is left without progress.
    pub fn create_card(
        &self,
        word: String,
        definition: String,
        translations: BTreeMap<String, String>,
        now: DateTime<Utc>,
    ) -> Result<Flashcard> {
        let mut card = Flashcard::new(word, definition, now);
        card.translations = translations;
        if card.word.trim().is_empty() {
            return Err(FlashcardStorageError::InvalidInput(
                "word must not be empty".to_string(),
            ));
        }

        let previous = self.progress.load_all()?;
        let mut states = previous.clone();
        states.push(ProgressState::new(card.id, now));
        self.progress.save_all(&states)?;

        if let Err(err) = self.catalog.add_card(&card) {
            if let Err(rollback) = self.progress.save_all(&previous) {
                log::warn!("Could not roll back progress for card {}: {}", card.id, rollback);
            }
            return Err(err);
        }

        log::info!("Created card {} ({})", card.id, card.word);
        Ok(card)
    }

    pub fn list_cards(&self) -> Result<Vec<Flashcard>> {
        self.catalog.list_cards()
    }

    pub fn get_card(&self, card_id: Uuid) -> Result<Flashcard> {
        self.catalog.get_card(card_id)
    }

    pub fn get_progress(&self, card_id: Uuid) -> Result<ProgressState> {
        self.progress.find(card_id)
    }

    // ==================== Review Operations ====================

    /// Due cards joined with their progress, oldest due date first.
    /// Progress records whose card is missing from the catalog are skipped.
    pub fn due_cards(&self, now: DateTime<Utc>, limit: Option<usize>) -> Result<Vec<CardWithProgress>> {
        let states = self.progress.load_all()?;
        let due: Vec<ProgressState> = states
            .into_iter()
            .filter(|s| algorithm::is_due(s, now))
            .collect();

        let mut due_cards = self.join_cards(due)?;

        // None sorts before Some, so undated cards come first
        due_cards.sort_by(|a, b| {
            a.progress
                .next_review_date()
                .cmp(&b.progress.next_review_date())
        });

        if let Some(limit) = limit {
            due_cards.truncate(limit);
        }
        Ok(due_cards)
    }

    /// Grade a review for a card, persist the new progress, and summarize it
    pub fn submit_answer(&self, card_id: Uuid, quality: i32, now: DateTime<Utc>) -> Result<ReviewOutcome> {
        let mut states = self.progress.load_all()?;
        let slot = states
            .iter_mut()
            .find(|s| s.card_id() == card_id)
            .ok_or(FlashcardStorageError::ProgressNotFound(card_id))?;

        *slot = algorithm::review(slot, quality, now);
        let outcome = ReviewOutcome::from_state(slot);
        self.progress.save_all(&states)?;

        log::info!(
            "Reviewed card {} with quality {}: next in {} day(s), ease {:.2}",
            card_id,
            quality,
            outcome.new_interval,
            outcome.new_ease_factor
        );
        Ok(outcome)
    }

    /// Intervals each quality grade would schedule for a card
    pub fn preview(&self, card_id: Uuid, now: DateTime<Utc>) -> Result<[i32; 6]> {
        let state = self.progress.find(card_id)?;
        Ok(algorithm::preview_intervals(&state, now))
    }

    pub fn statistics(&self, now: DateTime<Utc>) -> Result<ReviewStats> {
        let states = self.progress.load_all()?;
        Ok(algorithm::compute_statistics(&states, now))
    }

    /// Hardest cards first (lowest ease factor, then longest unreviewed)
    pub fn hardest_cards(&self, limit: usize) -> Result<Vec<CardWithProgress>> {
        let states = self.progress.load_all()?;
        let sorted = algorithm::sort_by_difficulty(&states);
        let mut cards = self.join_cards(sorted)?;
        cards.truncate(limit);
        Ok(cards)
    }

    fn join_cards(&self, states: Vec<ProgressState>) -> Result<Vec<CardWithProgress>> {
        let mut cards: HashMap<Uuid, Flashcard> = self
            .catalog
            .list_cards()?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut joined = Vec::with_capacity(states.len());
        for progress in states {
            match cards.remove(&progress.card_id()) {
                Some(card) => joined.push(CardWithProgress { card, progress }),
                None => log::warn!("Progress for unknown card {} skipped", progress.card_id()),
            }
        }
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::storage::MemoryProgressStore;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn create_test_service() -> (StudyService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let service = StudyService::open(temp_dir.path());
        (service, temp_dir)
    }

    fn add(service: &StudyService, word: &str) -> Flashcard {
        service
            .create_card(word.to_string(), format!("{} definition", word), BTreeMap::new(), now())
            .unwrap()
    }

    #[test]
    fn test_create_card_adds_progress() {
        let (service, _temp) = create_test_service();
        let card = add(&service, "talo");

        let progress = service.get_progress(card.id).unwrap();
        assert_eq!(progress.repetitions(), 0);
        assert_eq!(progress.next_review_date(), Some(now()));
        assert_eq!(service.list_cards().unwrap().len(), 1);
        assert_eq!(service.get_card(card.id).unwrap().word, "talo");
    }

    /// Store that loads nothing and refuses every save
    struct ReadOnlyStore;

    impl ProgressStore for ReadOnlyStore {
        fn load_all(&self) -> Result<Vec<ProgressState>> {
            Ok(Vec::new())
        }

        fn save_all(&self, _states: &[ProgressState]) -> Result<()> {
            Err(FlashcardStorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn test_create_card_progress_failure_keeps_catalog_clean() {
        let temp = TempDir::new().unwrap();
        let service = StudyService::new(CardCatalog::new(temp.path()), Box::new(ReadOnlyStore));

        let result = service.create_card("sana".to_string(), String::new(), BTreeMap::new(), now());
        assert!(matches!(result, Err(FlashcardStorageError::Io(_))));
        assert!(service.list_cards().unwrap().is_empty());
    }

    #[test]
    fn test_create_card_catalog_failure_rolls_back_progress() {
        let (service, temp) = create_test_service();
        let existing = add(&service, "vanha");
        std::fs::write(temp.path().join("cards.json"), "{ not json").unwrap();

        let result = service.create_card("uusi".to_string(), String::new(), BTreeMap::new(), now());
        assert!(matches!(result, Err(FlashcardStorageError::Json(_))));

        let stats = service.statistics(now()).unwrap();
        assert_eq!(stats.total_cards, 1);
        assert!(service.get_progress(existing.id).is_ok());
    }

    #[test]
    fn test_create_card_rejects_empty_word() {
        let (service, _temp) = create_test_service();
        let result = service.create_card("  ".to_string(), String::new(), BTreeMap::new(), now());
        assert!(matches!(result, Err(FlashcardStorageError::InvalidInput(_))));
        assert_eq!(service.statistics(now()).unwrap().total_cards, 0);
    }

    #[test]
    fn test_submit_answer_persists() {
        let (service, temp) = create_test_service();
        let card = add(&service, "vesi");

        service.submit_answer(card.id, 5, now()).unwrap();
        let outcome = service.submit_answer(card.id, 5, now()).unwrap();

        assert_eq!(outcome.new_interval, 3);
        assert_eq!(outcome.new_ease_factor, 2.7);

        // a fresh service over the same directory sees the update
        let reopened = StudyService::open(temp.path());
        let progress = reopened.get_progress(card.id).unwrap();
        assert_eq!(progress.repetitions(), 2);
        assert_eq!(progress.next_review_date(), Some(now() + Duration::days(3)));
    }

    #[test]
    fn test_submit_answer_unknown_card() {
        let (service, _temp) = create_test_service();
        let result = service.submit_answer(Uuid::new_v4(), 4, now());
        assert!(matches!(result, Err(FlashcardStorageError::ProgressNotFound(_))));
    }

    #[test]
    fn test_due_cards_ordering_and_limit() {
        let (service, _temp) = create_test_service();
        let first = add(&service, "yksi");
        let second = add(&service, "kaksi");
        let third = add(&service, "kolme");

        // push `first` into the future, leave the others due now
        service.submit_answer(first.id, 5, now()).unwrap();

        let due = service.due_cards(now(), None).unwrap();
        let ids: Vec<Uuid> = due.iter().map(|c| c.card.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&second.id));
        assert!(ids.contains(&third.id));

        let later = now() + Duration::days(1);
        assert_eq!(service.due_cards(later, None).unwrap().len(), 3);
        assert_eq!(service.due_cards(later, Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_due_cards_skip_dangling_progress() {
        let temp = TempDir::new().unwrap();
        let orphan = ProgressState::new(Uuid::new_v4(), now());
        let service = StudyService::new(
            CardCatalog::new(temp.path()),
            Box::new(MemoryProgressStore::new(vec![orphan])),
        );

        assert!(service.due_cards(now(), None).unwrap().is_empty());
        assert_eq!(service.statistics(now()).unwrap().total_cards, 1);
    }

    #[test]
    fn test_statistics_and_hardest() {
        let (service, _temp) = create_test_service();
        let easy = add(&service, "helppo");
        let hard = add(&service, "vaikea");
        add(&service, "uusi");

        service.submit_answer(easy.id, 5, now()).unwrap();
        service.submit_answer(hard.id, 1, now()).unwrap();

        let stats = service.statistics(now()).unwrap();
        assert_eq!(stats.total_cards, 3);
        assert_eq!(stats.new_cards, 2);
        assert_eq!(stats.total_repetitions, 1);
        assert_eq!(stats.due_cards, 1);

        let hardest = service.hardest_cards(2).unwrap();
        assert_eq!(hardest.len(), 2);
        assert_eq!(hardest[0].card.id, hard.id);
    }

    #[test]
    fn test_preview() {
        let (service, _temp) = create_test_service();
        let card = add(&service, "kuu");
        let preview = service.preview(card.id, now()).unwrap();
        assert_eq!(preview, [1, 1, 1, 1, 1, 1]);
    }
}
