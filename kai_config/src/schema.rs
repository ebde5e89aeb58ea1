use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub providers: ProvidersConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub gemini: GeminiConfig,
    pub chats: ChatStoreConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default = "GeminiConfig::default_model")]
    pub model: String,
}

impl GeminiConfig {
    fn default_model() -> String {
        "gemini-2.5-flash".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatStoreConfig {
    pub base_url: String,
    pub auth_token: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("kai");

        let config_path = config_dir.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'kai init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// True when both collaborator credentials are present. This is the
    /// boolean auth signal the orchestrator consumes; without it no
    /// turn is accepted.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.providers.gemini.api_key.trim().is_empty()
            && !self.providers.chats.auth_token.trim().is_empty()
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("kai");

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "providers": {
    "gemini": {
      "api_key": "your-gemini-api-key-here",
      "model": "gemini-2.5-flash"
    },
    "chats": {
      "base_url": "https://chats.example.com/api",
      "auth_token": "your-chat-store-token-here"
    }
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Gemini API key");
        println!("   2. Add the chat store base URL and auth token");
        println!("   3. Run 'kai chat' to start a conversation");
        println!();
        Ok(())
    }
}
