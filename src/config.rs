use std::collections::HashMap;
use std::env;
use std::fs;

use log::info;

/// Discord user pinged by the generic error notice when a pipeline fails.
const DEFAULT_OPERATOR_ID: u64 = 129678295057956864;

/// Everything the bot needs at startup, read once and handed to the handlers
/// through the application context instead of module globals.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub openai_key: String,
    pub guild_id: u64,
    pub prefix: String,
    pub operator_id: u64,
}

impl BotConfig {
    /// Load configuration from `botconfig.txt` (searched in the usual spots)
    /// with the environment as fallback for anything already exported.
    pub fn load() -> Result<Self, String> {
        if let Some((path, values)) = read_config_file() {
            info!("✅ Configuration loaded from {}", path);
            for (key, value) in values {
                env::set_var(key, value);
            }
        } else {
            info!("🔧 No botconfig.txt found, using environment variables");
        }

        let discord_token = required("DISCORD_TOKEN")?;
        if discord_token == "YOUR_BOT_TOKEN_HERE" {
            return Err("DISCORD_TOKEN is set to the placeholder value".to_string());
        }
        let openai_key = required("OPENAI_KEY")?;
        let guild_id = required("GUILD_ID")?
            .parse()
            .map_err(|_| "GUILD_ID is not a valid Discord guild id".to_string())?;
        let prefix = env::var("PREFIX").unwrap_or_else(|_| "$".to_string());
        let operator_id = match env::var("OPERATOR_ID") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| "OPERATOR_ID is not a valid Discord user id".to_string())?,
            Err(_) => DEFAULT_OPERATOR_ID,
        };

        Ok(Self {
            discord_token,
            openai_key,
            guild_id,
            prefix,
            operator_id,
        })
    }

    /// Mention string for the escalation target, e.g. `<@129678295057956864>`.
    pub fn operator_mention(&self) -> String {
        format!("<@{}>", self.operator_id)
    }
}

fn required(key: &str) -> Result<String, String> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("required setting '{}' is missing", key)),
    }
}

fn read_config_file() -> Option<(&'static str, HashMap<String, String>)> {
    let config_paths = [
        "botconfig.txt",
        "../botconfig.txt",
        "../../botconfig.txt",
        "src/botconfig.txt",
    ];
    for path in config_paths {
        if let Ok(content) = fs::read_to_string(path) {
            return Some((path, parse_config(&content)));
        }
    }
    None
}

/// Parse KEY=VALUE lines, skipping comments and blank lines. A UTF-8 BOM on
/// the first line is tolerated.
fn parse_config(content: &str) -> HashMap<String, String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut config = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(equals_pos) = line.find('=') {
            let key = line[..equals_pos].trim().to_string();
            let value = line[equals_pos + 1..].trim().to_string();
            config.insert(key, value);
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_value_lines() {
        let content = "DISCORD_TOKEN=abc123\nPREFIX=$\n";
        let config = parse_config(content);
        assert_eq!(config.get("DISCORD_TOKEN").unwrap(), "abc123");
        assert_eq!(config.get("PREFIX").unwrap(), "$");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let content = "# settings\n\nOPENAI_KEY = sk-test\n# PREFIX=^\n";
        let config = parse_config(content);
        assert_eq!(config.len(), 1);
        assert_eq!(config.get("OPENAI_KEY").unwrap(), "sk-test");
    }

    #[test]
    fn strips_utf8_bom() {
        let content = "\u{feff}GUILD_ID=1234\n";
        let config = parse_config(content);
        assert_eq!(config.get("GUILD_ID").unwrap(), "1234");
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let content = "OPENAI_KEY=sk-abc=def\n";
        let config = parse_config(content);
        assert_eq!(config.get("OPENAI_KEY").unwrap(), "sk-abc=def");
    }

    #[test]
    fn operator_mention_formats_a_discord_mention() {
        let config = BotConfig {
            discord_token: "t".to_string(),
            openai_key: "k".to_string(),
            guild_id: 1,
            prefix: "$".to_string(),
            operator_id: 129678295057956864,
        };
        assert_eq!(config.operator_mention(), "<@129678295057956864>");
    }
}
