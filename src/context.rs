use std::path::PathBuf;
use std::sync::Arc;

use serenity::prelude::TypeMapKey;

use crate::completion::CompletionClient;
use crate::config::BotConfig;

/// Shared application state, built once at startup and injected into every
/// command handler through serenity's TypeMap.
pub struct AppContext {
    /// Client for attachment downloads. Deliberately has no timeout: a hung
    /// upstream stalls the one handler that is waiting on it.
    pub http: reqwest::Client,
    pub completion: CompletionClient,
    /// Working directory for downloaded PDFs and text sidecars, created on
    /// demand. Files are never cleaned up.
    pub files_dir: PathBuf,
    pub operator_mention: String,
    pub guild_id: u64,
}

impl AppContext {
    pub fn new(config: &BotConfig) -> Self {
        let http = reqwest::Client::new();
        Self {
            completion: CompletionClient::new(http.clone(), config.openai_key.clone()),
            http,
            files_dir: PathBuf::from("files"),
            operator_mention: config.operator_mention(),
            guild_id: config.guild_id,
        }
    }
}

impl TypeMapKey for AppContext {
    type Value = Arc<AppContext>;
}
