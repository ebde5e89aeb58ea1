//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own type, enabling
//! compile-time dispatch with no boxing of command arguments.

use kai_config::Config;
use kai_providers::{ChatStoreClient, GeminiClient};
use tracing::info;

mod chat;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// The wired-up collaborators for one conversation, plus the auth
/// signal derived from the configured credentials.
pub struct Components {
    pub sessions: ChatStoreClient,
    pub generator: GeminiClient,
    pub authenticated: bool,
}

/// Load the config and build authenticated call handles for both
/// remote collaborators.
fn init_components(model_override: Option<String>) -> anyhow::Result<Components> {
    let config = Config::load()?;
    let authenticated = config.is_authenticated();

    if !authenticated {
        info!("Missing credentials; submissions will be rejected");
    }

    let model = model_override.unwrap_or(config.providers.gemini.model);
    let generator = GeminiClient::new(config.providers.gemini.api_key, model);
    let sessions = ChatStoreClient::new(
        config.providers.chats.base_url,
        config.providers.chats.auth_token,
    );

    Ok(Components {
        sessions,
        generator,
        authenticated,
    })
}

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type via an associated type,
/// enabling type-safe parameter passing without runtime casting.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
