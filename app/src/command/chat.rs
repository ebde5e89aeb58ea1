//! Multi-turn conversation command.
//!
//! One invocation owns one conversation: the session is created by the
//! first successful turn and every later turn reuses it.

use kai_conversation::ChatOrchestrator;
use tracing::info;

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
}

/// Strategy for executing the Chat command.
///
/// - Wires both remote collaborators from the config
/// - Runs a single turn or an interactive loop
/// - Surfaces turn failures as the conversation status line
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let components = super::init_components(input.model)?;

        let mut orchestrator = ChatOrchestrator::new(
            components.sessions,
            components.generator,
            components.authenticated,
        );

        if let Some(msg) = input.message {
            // Single message mode
            orchestrator.set_draft(msg);
            match orchestrator.submit().await {
                Ok(reply) => println!("{reply}"),
                Err(e) => {
                    eprintln!("Error: {e}");
                    eprintln!("{}", orchestrator.conversation().status);
                }
            }
        } else {
            // Interactive mode
            orchestrator.run_interactive().await?;
        }

        let conversation = orchestrator.conversation();
        info!(
            "Conversation ended: {} messages, session: {:?}",
            conversation.message_count(),
            conversation.session_id
        );

        Ok(())
    }
}
