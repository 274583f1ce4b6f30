mod settings;

pub use settings::{
    DatabaseConfig, HistoryConfig, RagConfig, ServerConfig, Settings, FREE_TIER_PLACEHOLDER,
};
