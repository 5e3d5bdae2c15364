//! Spaced repetition scheduling for vocabulary flashcards.
//!
//! The scheduler itself lives in [`flashcards::algorithm`] and is pure;
//! [`flashcards::StudyService`] wires it to the card catalog and progress
//! storage, and [`server`] exposes the service over HTTP.

pub mod config;
pub mod flashcards;
pub mod server;
