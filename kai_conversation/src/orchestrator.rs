//! The turn state machine.
//!
//! `ChatOrchestrator` drives one conversation: it applies the user
//! message optimistically, walks the dependent remote calls in order
//! (session, generation, persistence), and restores the pre-turn
//! transcript when any stage fails. The `busy` flag is the sole
//! mutual-exclusion mechanism; a submission while busy is rejected,
//! never queued.

use std::io::Write;
use std::sync::Arc;

use tracing::{debug, info, warn};

use kai_core::{ContextEntry, GenerationResult, GenerationService, Message, SessionService};

use crate::conversation::{Conversation, STATUS_READY};
use crate::error::TurnError;
use crate::history;
use crate::reply;

const STATUS_STARTING: &str = "Starting conversation...";
const STATUS_CREATING_SESSION: &str = "Creating a new chat session...";
const STATUS_THINKING: &str = "Kai is thinking...";
const STATUS_SAVING: &str = "Reply received, saving interaction...";

/// Where the current turn stands.
///
/// Success path: `Idle -> Submitting -> AwaitingSession ->
/// AwaitingGeneration -> Persisting -> Idle`. Any failure after
/// acceptance passes through `RollingBack` on its way back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Submitting,
    AwaitingSession,
    AwaitingGeneration,
    Persisting,
    RollingBack,
}

/// Orchestrates chat turns against the two remote collaborators.
///
/// The collaborators arrive as authenticated call handles; the
/// `authenticated` flag is the host's boolean auth signal and gates
/// submission up front.
pub struct ChatOrchestrator<S = Arc<dyn SessionService>, G = Arc<dyn GenerationService>>
where
    S: Send + Sync,
    G: Send + Sync,
{
    sessions: S,
    generator: G,
    authenticated: bool,
    conversation: Conversation,
    phase: TurnPhase,
}

impl<S, G> ChatOrchestrator<S, G>
where
    S: SessionService + Send + Sync,
    G: GenerationService + Send + Sync,
{
    /// Create an orchestrator over a fresh conversation.
    pub fn new(sessions: S, generator: G, authenticated: bool) -> Self {
        Self {
            sessions,
            generator,
            authenticated,
            conversation: Conversation::new(),
            phase: TurnPhase::Idle,
        }
    }

    /// Current conversation state.
    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Current turn phase.
    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Replace the draft prompt.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.conversation.set_draft(text);
    }

    /// Run one turn from the current draft prompt.
    ///
    /// Validation failures (`busy`, unauthenticated, blank prompt) are
    /// rejected before any state change or remote call. After
    /// acceptance, any failure restores the transcript to exactly its
    /// pre-turn content, clears `busy`, and leaves the error summary in
    /// `status`. The draft is consumed either way.
    pub async fn submit(&mut self) -> Result<String, TurnError> {
        if self.conversation.busy {
            return Err(TurnError::TurnInProgress);
        }
        if !self.authenticated {
            return Err(TurnError::NotAuthenticated);
        }
        let prompt = self.conversation.draft.trim().to_string();
        if prompt.is_empty() {
            return Err(TurnError::EmptyPrompt);
        }

        // Snapshot before the optimistic append; this is both the
        // rollback target and the history context for this turn.
        let snapshot = self.conversation.messages.clone();

        self.phase = TurnPhase::Submitting;
        self.conversation.messages.push(Message::user(&prompt));
        self.conversation.draft.clear();
        self.conversation.busy = true;
        self.conversation.status = STATUS_STARTING.to_string();

        info!(
            "Turn started: {} prior messages, prompt_len={}",
            snapshot.len(),
            prompt.len()
        );

        match self.run_turn(&prompt, &snapshot).await {
            Ok(reply_text) => {
                self.conversation.messages.push(Message::model(&reply_text));
                self.conversation.status = STATUS_READY.to_string();
                self.conversation.busy = false;
                self.phase = TurnPhase::Idle;
                info!("Turn completed: {} messages", self.conversation.message_count());
                Ok(reply_text)
            }
            Err(e) => {
                warn!("Turn failed, rolling back: {e}");
                self.phase = TurnPhase::RollingBack;
                self.conversation.messages = snapshot;
                self.conversation.status = format!("Chat turn failed: {e}");
                self.conversation.busy = false;
                self.phase = TurnPhase::Idle;
                Err(e)
            }
        }
    }

    /// The remote half of a turn: session, context, generation,
    /// extraction, persistence. Never touches the transcript.
    async fn run_turn(&mut self, prompt: &str, history: &[Message]) -> Result<String, TurnError> {
        let session_id = self.ensure_session(prompt).await?;

        let context = history::build_context(history);
        if let Ok(rendered) = history::render_context(&context) {
            debug!("Context for generation: {rendered}");
        }

        self.phase = TurnPhase::AwaitingGeneration;
        self.conversation.status = STATUS_THINKING.to_string();

        let raw = match self.dispatch(prompt, &context).await {
            GenerationResult::Ok(raw) => raw,
            GenerationResult::Err(message) => return Err(TurnError::Generation(message)),
        };

        let reply_text = reply::extract_reply_text(&raw)?;

        self.phase = TurnPhase::Persisting;
        self.conversation.status = STATUS_SAVING.to_string();

        self.sessions
            .add_interaction(&session_id, prompt, &reply_text)
            .await
            .map_err(|e| TurnError::Persistence(e.to_string()))?;

        Ok(reply_text)
    }

    /// Return the conversation's session id, creating it on first use.
    ///
    /// Creation happens at most once per conversation: once an id is
    /// stored it is returned without a remote call, and on failure the
    /// id stays unset so a later turn can retry.
    async fn ensure_session(&mut self, first_prompt: &str) -> Result<String, TurnError> {
        if let Some(id) = &self.conversation.session_id {
            return Ok(id.clone());
        }

        self.phase = TurnPhase::AwaitingSession;
        self.conversation.status = STATUS_CREATING_SESSION.to_string();

        let id = self
            .sessions
            .create_session(first_prompt)
            .await
            .map_err(|e| TurnError::SessionCreation(e.to_string()))?;

        if id.trim().is_empty() {
            return Err(TurnError::SessionCreation(
                "session service returned an empty id".to_string(),
            ));
        }

        info!("Created chat session: {id}");
        self.conversation.session_id = Some(id.clone());
        Ok(id)
    }

    /// Call the generation service, folding transport failures into the
    /// two-variant result so the caller branches exactly once.
    async fn dispatch(&self, prompt: &str, context: &[ContextEntry]) -> GenerationResult {
        match self.generator.generate_reply(prompt, context).await {
            Ok(result) => result,
            Err(e) => GenerationResult::Err(e.to_string()),
        }
    }

    /// Run an interactive conversation loop on stdin/stdout.
    pub async fn run_interactive(&mut self) -> anyhow::Result<()> {
        println!("Type 'exit', 'quit', or Ctrl+C to end the session.\n");

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            let input = input.trim();

            if matches!(input, "exit" | "quit" | "q") {
                println!(
                    "\nSession ended. Total turns: {}",
                    self.conversation.message_count() / 2
                );
                break;
            }

            if input.is_empty() {
                continue;
            }

            self.set_draft(input);
            match self.submit().await {
                Ok(reply_text) => println!("\n{reply_text}\n"),
                Err(e) => eprintln!("Error: {e}"),
            }
        }

        Ok(())
    }
}
