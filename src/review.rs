use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{error, info, warn};
use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};
use uuid::Uuid;

use crate::completion::{review_prompt, Complete};
use crate::context::AppContext;
use crate::cooldown::{cooldown_notice, Cooldowns};
use crate::error::BotError;
use crate::extract::{ExtractText, PdfExtractor};
use crate::fetch::download_file;

const MULTI_PAGE_WARNING: &str = "⚠️ Your resume has multiple pages. Only the first page will be scored. Two page resumes are not recommended.";

/// `$review` — attach a PDF résumé, get a numbered list of improvements.
///
/// Lifecycle per invocation: cooldown gate, attachment validation, pending
/// status message, download, first-page extraction, one completion call, then
/// exactly one edit of the pending message with either the feedback or the
/// generic error notice.
#[command]
pub async fn review(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    let mention = format!("<@{}>", msg.author.id);
    info!(
        "📄 Review requested by {} ({})",
        msg.author.name, msg.author.id
    );

    {
        let mut data = ctx.data.write().await;
        if let Some(cooldowns) = data.get_mut::<Cooldowns>() {
            if let Err(retry_after) = cooldowns.review.try_use(msg.author.id, Instant::now()) {
                drop(data);
                warn!(
                    "⌛ Review cooldown hit by {} ({:.2}s left)",
                    msg.author.name, retry_after
                );
                msg.channel_id
                    .say(&ctx.http, cooldown_notice(&mention, retry_after))
                    .await?;
                return Ok(());
            }
        }
    }

    // Validation happens before the pending message exists: a bad invocation
    // gets a usage reply and nothing else.
    let attachment = match msg.attachments.first() {
        Some(a) if is_pdf_filename(&a.filename) => a,
        _ => {
            msg.channel_id
                .say(
                    &ctx.http,
                    format!("{}, please send a PDF file of your resume.", mention),
                )
                .await?;
            return Ok(());
        }
    };

    let app = {
        let data = ctx.data.read().await;
        data.get::<AppContext>()
            .map(Arc::clone)
            .ok_or("application context not initialized")?
    };

    let mut pending = msg
        .channel_id
        .say(
            &ctx.http,
            format!("🤖 Processing your resume {}...", mention),
        )
        .await?;

    std::fs::create_dir_all(&app.files_dir)?;
    // Random filename so concurrent users never collide on disk. The file is
    // kept afterwards, together with its text sidecar.
    let file_path = app
        .files_dir
        .join(format!("{}.pdf", Uuid::new_v4().simple()));

    if let Err(e) = download_file(&app.http, &attachment.url, None, &file_path).await {
        error!("❌ Download failed for {}: {}", msg.author.name, e);
        pending
            .edit(&ctx.http, |m| {
                m.content(e.user_notice("resume", &mention, &app.operator_mention))
            })
            .await?;
        return Ok(());
    }

    let run = run_review(&PdfExtractor, &app.completion, &file_path).await;
    if run.multi_page {
        msg.channel_id.say(&ctx.http, MULTI_PAGE_WARNING).await?;
    }
    match run.result {
        Ok(feedback) => {
            info!("✅ Resume feedback delivered to {}", msg.author.name);
            pending
                .edit(&ctx.http, |m| m.content(feedback_message(&mention, &feedback)))
                .await?;
        }
        Err(e) => {
            error!("❌ Review pipeline failed for {}: {}", msg.author.name, e);
            pending
                .edit(&ctx.http, |m| {
                    m.content(e.user_notice("resume", &mention, &app.operator_mention))
                })
                .await?;
        }
    }

    Ok(())
}

pub(crate) struct ReviewRun {
    pub multi_page: bool,
    pub result: Result<String, BotError>,
}

/// Extracting → Completing, with the stop-on-failure rule: an extraction
/// failure never reaches the completion endpoint.
pub(crate) async fn run_review(
    extractor: &dyn ExtractText,
    completer: &dyn Complete,
    file_path: &Path,
) -> ReviewRun {
    let extraction = match extractor.extract_first_page(file_path) {
        Ok(extraction) => extraction,
        Err(e) => {
            return ReviewRun {
                multi_page: false,
                result: Err(e),
            }
        }
    };
    let multi_page = extraction.multi_page;
    let result = completer.complete(&review_prompt(&extraction.text)).await;
    ReviewRun { multi_page, result }
}

pub(crate) fn is_pdf_filename(filename: &str) -> bool {
    filename.ends_with(".pdf")
}

pub(crate) fn feedback_message(mention: &str, feedback: &str) -> String {
    format!(
        "🤖 Here is your resume feedback {}:\n\n{}",
        mention, feedback
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extraction;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubExtractor {
        text: &'static str,
        multi_page: bool,
    }

    impl ExtractText for StubExtractor {
        fn extract_first_page(&self, _path: &Path) -> Result<Extraction, BotError> {
            Ok(Extraction {
                text: self.text.to_string(),
                multi_page: self.multi_page,
            })
        }
    }

    struct FailingExtractor;

    impl ExtractText for FailingExtractor {
        fn extract_first_page(&self, _path: &Path) -> Result<Extraction, BotError> {
            Err(BotError::Extract("unreadable".to_string()))
        }
    }

    struct StubCompleter {
        reply: Result<&'static str, u16>,
        calls: AtomicUsize,
    }

    impl StubCompleter {
        fn ok(reply: &'static str) -> Self {
            Self {
                reply: Ok(reply),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Complete for StubCompleter {
        async fn complete(&self, _system_prompt: &str) -> Result<String, BotError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(BotError::Completion { status }),
            }
        }
    }

    #[test]
    fn only_pdf_filenames_validate() {
        assert!(is_pdf_filename("resume.pdf"));
        assert!(!is_pdf_filename("resume.docx"));
        assert!(!is_pdf_filename("resume.pdf.png"));
        assert!(!is_pdf_filename(""));
    }

    #[tokio::test]
    async fn end_to_end_success_produces_the_exact_final_message() {
        let extractor = StubExtractor {
            text: "Built X using Y",
            multi_page: false,
        };
        let completer = StubCompleter::ok("1. Quantify impact of X");

        let run = run_review(&extractor, &completer, Path::new("resume.pdf")).await;
        assert!(!run.multi_page);
        let final_message = feedback_message("@user", &run.result.unwrap());
        assert_eq!(
            final_message,
            "🤖 Here is your resume feedback @user:\n\n1. Quantify impact of X"
        );
    }

    #[tokio::test]
    async fn extraction_failure_never_reaches_the_completion_endpoint() {
        let completer = StubCompleter::ok("unused");

        let run = run_review(&FailingExtractor, &completer, Path::new("resume.pdf")).await;
        assert!(matches!(run.result, Err(BotError::Extract(_))));
        assert_eq!(completer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn multi_page_flag_survives_a_completion_failure() {
        let extractor = StubExtractor {
            text: "Built X using Y",
            multi_page: true,
        };
        let completer = StubCompleter::failing(500);

        let run = run_review(&extractor, &completer, Path::new("resume.pdf")).await;
        assert!(run.multi_page);
        assert!(matches!(
            run.result,
            Err(BotError::Completion { status: 500 })
        ));
        assert_eq!(completer.calls.load(Ordering::SeqCst), 1);
    }
}
