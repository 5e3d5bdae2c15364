//! Flashcard and spaced repetition system
//!
//! This module provides:
//! - Review progress state with clamped invariants
//! - SM-2 spaced repetition algorithm
//! - Card catalog and progress persistence
//! - Study operations composing the above

pub mod algorithm;
pub mod models;
pub mod service;
pub mod storage;

pub use algorithm::ReviewOutcome;
pub use models::*;
pub use service::StudyService;
pub use storage::{
    CardCatalog, FlashcardStorageError, JsonProgressStore, MemoryProgressStore, ProgressStore,
};
