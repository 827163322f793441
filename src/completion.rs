use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};

use crate::error::BotError;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Model and output budget are fixed configuration, never caller-controlled.
const MODEL: &str = "gpt-4";
const MAX_TOKENS: i32 = 350;

#[derive(Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    model: String,
    max_tokens: i32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<MessageContent>,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

/// Seam between the command handlers and the upstream LLM, so handlers can be
/// exercised against canned feedback in tests.
#[async_trait]
pub trait Complete: Send + Sync {
    async fn complete(&self, system_prompt: &str) -> Result<String, BotError>;
}

/// One-shot chat-completion client. No retry: a failed request is terminal
/// for the invocation that made it.
pub struct CompletionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl CompletionClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            endpoint: OPENAI_CHAT_URL.to_string(),
            api_key,
        }
    }

    /// Point the client somewhere other than the OpenAI endpoint. Used by
    /// the tests to target a local stub server.
    #[allow(dead_code)]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl Complete for CompletionClient {
    async fn complete(&self, system_prompt: &str) -> Result<String, BotError> {
        info!("🤖 Calling completion endpoint ({})", MODEL);

        let request = ChatRequest {
            messages: vec![ChatMessage {
                role: "system".to_string(),
                content: system_prompt.to_string(),
            }],
            model: MODEL.to_string(),
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(BotError::Completion {
                status: status.as_u16(),
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| BotError::CompletionBody(e.to_string()))?;
        let feedback = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| {
                BotError::CompletionBody("response carried no message content".to_string())
            })?;

        debug!("✅ Completion returned {} characters", feedback.len());
        Ok(feedback)
    }
}

/// System prompt for `$review`: full résumé text, recruiter persona.
pub fn review_prompt(resume_text: &str) -> String {
    format!(
        "You're a recruiter helping candidates improve their resumes:\n###\n{}\n###\n\
         Please provide concise feedback and actionable improvements to this resume, citing specific examples.\n\
         Rules: Do not recommend adding a career summary at the top. Do not nitpick on spacing. \
         Do not worry about formatting or styles. Don't worry about multiple roles at the same company. \
         Only return a numbered list of actionable improvements, no additional text.",
        resume_text
    )
}

/// System prompt for `$revise`: raw bullet list.
pub fn revise_prompt(bullets: &str) -> String {
    format!(
        "Help revise these bullet points for a resume:\n###\n{}\n\
         Rules: Return only a revised copy of each bullet point if necessary.",
        bullets
    )
}
