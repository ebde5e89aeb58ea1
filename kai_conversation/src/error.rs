use thiserror::Error;

/// Errors that can end a chat turn.
///
/// The first three variants are validation failures: they are raised
/// before any remote call and leave the conversation untouched. The
/// rest occur mid-turn and are resolved by rolling the transcript back
/// to its pre-turn snapshot. Display strings double as the
/// human-readable status summary, so the underlying service message is
/// carried verbatim.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("a turn is already in flight")]
    TurnInProgress,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("prompt is empty")]
    EmptyPrompt,

    #[error("failed to create chat session: {0}")]
    SessionCreation(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("malformed generation payload: {0}")]
    ResponseShape(String),

    #[error("failed to save interaction: {0}")]
    Persistence(String),
}

impl TurnError {
    /// Whether the error was rejected up front, before any state change
    /// or remote call.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TurnInProgress | Self::NotAuthenticated | Self::EmptyPrompt
        )
    }
}
