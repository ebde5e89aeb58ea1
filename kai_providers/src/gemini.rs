use async_trait::async_trait;
use kai_core::{ContextEntry, GenerationResult, GenerationService};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Generation client for the Gemini `generateContent` endpoint.
///
/// An HTTP error status is a logical failure and becomes
/// [`GenerationResult::Err`] with the message parsed from the error
/// body; only transport problems surface as `anyhow::Error`.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        info!("Creating GeminiClient for model: {model}");
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url: BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Pull a readable message out of an error body, falling back to
    /// the body itself when it is not the documented error shape.
    fn error_message(body: &str) -> String {
        serde_json::from_str::<ErrorWrapper>(body).map_or_else(
            |_| body.to_string(),
            |wrapper| {
                let status = wrapper.error.status.unwrap_or_default();
                let message = wrapper
                    .error
                    .message
                    .unwrap_or_else(|| body.to_string());
                if status.is_empty() {
                    message
                } else {
                    format!("{status}: {message}")
                }
            },
        )
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate_reply(
        &self,
        prompt: &str,
        context: &[ContextEntry],
    ) -> anyhow::Result<GenerationResult> {
        let mut contents: Vec<ContextEntry> = context.to_vec();
        contents.push(ContextEntry::new("user", prompt));

        let request = json!({ "contents": contents });
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        info!(
            "Sending generation request: model={}, context_entries={}",
            self.model,
            context.len()
        );

        let response = self.client.post(url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            info!("Received generation response");
            Ok(GenerationResult::Ok(body))
        } else {
            Ok(GenerationResult::Err(Self::error_message(&body)))
        }
    }
}
