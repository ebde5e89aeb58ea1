use async_trait::async_trait;
use kai_core::SessionService;
use reqwest::Client;
use serde_json::json;
use tracing::info;

/// REST client for the chat store, reached through a bearer token (the
/// authenticated call handle).
pub struct ChatStoreClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ChatStoreClient {
    pub fn new(base_url: String, token: String) -> Self {
        info!("Creating ChatStoreClient for {base_url}");
        Self {
            client: Client::new(),
            base_url,
            token,
        }
    }
}

#[async_trait]
impl SessionService for ChatStoreClient {
    async fn create_session(&self, first_prompt: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .post(format!("{}/chats", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({ "first_prompt": first_prompt }))
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        let id = response["id"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing id"))?
            .to_string();

        info!("Chat store created session: {id}");
        Ok(id)
    }

    async fn add_interaction(
        &self,
        session_id: &str,
        prompt: &str,
        reply: &str,
    ) -> anyhow::Result<()> {
        self.client
            .post(format!("{}/chats/{session_id}/interactions", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({ "prompt": prompt, "reply": reply }))
            .send()
            .await?
            .error_for_status()?;

        info!("Recorded interaction for session: {session_id}");
        Ok(())
    }
}
