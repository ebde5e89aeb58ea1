#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Multi-turn conversation orchestration with optimistic updates.
//!
//! This crate owns the flow of one chat turn: ensure a session exists,
//! serialize the prior history, call the generation service, persist
//! the finished interaction, and reconcile local state. The user
//! message is applied optimistically; any failure rolls the transcript
//! back to exactly its pre-turn content.
//!
//! # Key Features
//! - Explicit turn state machine with a rollback terminal transition
//! - At-most-once session creation per conversation
//! - History context that always excludes the in-flight turn
//! - Uniform two-variant handling of generation outcomes

mod conversation;
mod error;
pub mod history;
pub mod reply;
mod orchestrator;

pub use conversation::Conversation;
pub use error::TurnError;
pub use orchestrator::{ChatOrchestrator, TurnPhase};
