#![deny(
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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sender {
    User,
    Model,
}

impl Sender {
    /// Role label used on the wire by the generation service.
    #[must_use]
    pub const fn as_role(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }

    /// Inverse of [`Self::as_role`].
    #[must_use]
    pub fn from_role(role: &str) -> Option<Self> {
        match role {
            "user" => Some(Self::User),
            "model" => Some(Self::Model),
            _ => None,
        }
    }
}

/// One entry of the conversation transcript. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Model,
            text: text.into(),
        }
    }
}

/// A single text fragment inside a context entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextPart {
    pub text: String,
}

/// Serialized-history entry in the shape the generation service accepts:
/// a role label plus a list of text parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextEntry {
    pub role: String,
    pub parts: Vec<TextPart>,
}

impl ContextEntry {
    #[must_use]
    pub fn new(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![TextPart { text: text.into() }],
        }
    }
}

/// Outcome of one generation call, matched exhaustively by callers.
///
/// `Ok` carries the provider's raw structured response; `Err` carries a
/// logical error message tagged inside the service reply. Transport
/// failures are folded into `Err` by the dispatcher so consumers only
/// ever branch on these two variants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenerationResult {
    Ok(String),
    Err(String),
}

/// Remote session store: creates conversation sessions and records
/// finalized (prompt, reply) interactions against them.
#[async_trait]
pub trait SessionService: Send + Sync {
    async fn create_session(&self, first_prompt: &str) -> anyhow::Result<String>;
    async fn add_interaction(
        &self,
        session_id: &str,
        prompt: &str,
        reply: &str,
    ) -> anyhow::Result<()>;
}

/// Remote generation service. The `anyhow::Error` path is transport
/// failure only; logical failures arrive as [`GenerationResult::Err`].
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate_reply(
        &self,
        prompt: &str,
        context: &[ContextEntry],
    ) -> anyhow::Result<GenerationResult>;
}
