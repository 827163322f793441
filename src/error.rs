use thiserror::Error;

/// Everything that can go wrong between "pending message sent" and "pending
/// message edited". Validation problems are handled before any of these can
/// occur and never reach this type.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("download failed with HTTP status {status}")]
    Fetch { status: u16 },

    #[error("could not read PDF: {0}")]
    Extract(String),

    #[error("completion request failed with HTTP status {status}")]
    Completion { status: u16 },

    #[error("malformed completion response: {0}")]
    CompletionBody(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Map any processing error onto the one generic user-facing notice.
    ///
    /// Every error kind collapses to the same text on purpose: users get a
    /// uniform "we broke, a human was pinged" message while the real cause
    /// goes to the log. `subject` is what was being processed ("resume" or
    /// "bullets"), `operator` is the escalation mention.
    pub fn user_notice(&self, subject: &str, mention: &str, operator: &str) -> String {
        error_notice(subject, mention, operator)
    }
}

pub fn error_notice(subject: &str, mention: &str, operator: &str) -> String {
    format!(
        "⚠️ There was an error processing your {} {}. {} will look into it.",
        subject, mention, operator
    )
}
