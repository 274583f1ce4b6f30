use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Stand-in free-tier credential used when none is configured.
pub const FREE_TIER_PLACEHOLDER: &str = "dummy-free-tier-key";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerConfig,
    pub history: HistoryConfig,
    /// When absent, the server falls back to in-memory chat history.
    pub database: Option<DatabaseConfig>,
    pub rag: RagConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5001,
        }
    }
}

/// Fixed path segments under which a session's messages are stored in the
/// durable backend.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct HistoryConfig {
    pub app_id: String,
    pub user_id: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            app_id: "default-app-id-local".to_string(),
            user_id: "anonymous_local_user".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
    #[serde(default = "default_pool_timeout_seconds")]
    pub pool_timeout_seconds: u64,
}

fn default_pool_max_size() -> u32 {
    5
}

fn default_pool_timeout_seconds() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct RagConfig {
    pub base_url: String,
    pub chunk_store_path: String,
    pub embeddings_source_path: String,
    pub timeout_seconds: u64,
    pub free_tier_api_key: String,
    pub paid_api_key: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8001".to_string(),
            chunk_store_path: "data/chunk_store_wiki_only.json".to_string(),
            embeddings_source_path: "data/chunks_for_embeddings_source.json".to_string(),
            timeout_seconds: 120,
            free_tier_api_key: String::new(),
            paid_api_key: String::new(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config/settings").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Credential policy: the paid-tier key is mandatory and its absence is a
    /// fatal startup error; a missing free-tier key degrades to a placeholder.
    pub fn validate(&mut self) -> Result<()> {
        if self.rag.paid_api_key.is_empty() {
            bail!("paid-tier API key is not set; refusing to start");
        }

        if self.rag.free_tier_api_key.is_empty() {
            warn!("Free-tier API key is not set, using placeholder credential");
            self.rag.free_tier_api_key = FREE_TIER_PLACEHOLDER.to_string();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_settings() -> Settings {
        Settings {
            rag: RagConfig {
                paid_api_key: "paid-key".to_string(),
                ..RagConfig::default()
            },
            ..Settings::default()
        }
    }

    #[test]
    fn missing_paid_key_is_fatal() {
        let mut settings = base_settings();
        settings.rag.paid_api_key.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn missing_free_key_degrades_to_placeholder() {
        let mut settings = base_settings();
        settings.validate().unwrap();
        assert_eq!(settings.rag.free_tier_api_key, FREE_TIER_PLACEHOLDER);
    }

    #[test]
    fn configured_free_key_is_kept() {
        let mut settings = base_settings();
        settings.rag.free_tier_api_key = "real-free-key".to_string();
        settings.validate().unwrap();
        assert_eq!(settings.rag.free_tier_api_key, "real-free-key");
    }
}
