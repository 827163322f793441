use std::sync::Arc;
use std::time::Instant;

use log::{error, info, warn};
use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

use crate::completion::{revise_prompt, Complete};
use crate::context::AppContext;
use crate::cooldown::{cooldown_notice, Cooldowns};
use crate::error::BotError;

/// `$revise <bullets>` — paste bullet points, get revised copies back.
///
/// No attachment or download phase: the whole remainder of the message is
/// the bullet text and goes straight to the completion endpoint.
#[command]
pub async fn revise(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let mention = format!("<@{}>", msg.author.id);
    info!(
        "📝 Revise requested by {} ({})",
        msg.author.name, msg.author.id
    );

    {
        let mut data = ctx.data.write().await;
        if let Some(cooldowns) = data.get_mut::<Cooldowns>() {
            if let Err(retry_after) = cooldowns.revise.try_use(msg.author.id, Instant::now()) {
                drop(data);
                warn!(
                    "⌛ Revise cooldown hit by {} ({:.2}s left)",
                    msg.author.name, retry_after
                );
                msg.channel_id
                    .say(&ctx.http, cooldown_notice(&mention, retry_after))
                    .await?;
                return Ok(());
            }
        }
    }

    let bullets = args.message().trim().to_string();
    if bullets.is_empty() {
        msg.channel_id
            .say(
                &ctx.http,
                format!(
                    "{}, please include your bullet points: `$revise <bullets>`",
                    mention
                ),
            )
            .await?;
        return Ok(());
    }

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
            format!("🤖 Thinking of revisions {}...", mention),
        )
        .await?;

    match run_revise(&app.completion, &bullets).await {
        Ok(feedback) => {
            info!("✅ Revised bullets delivered to {}", msg.author.name);
            pending
                .edit(&ctx.http, |m| m.content(revised_message(&mention, &feedback)))
                .await?;
        }
        Err(e) => {
            error!("❌ Revise pipeline failed for {}: {}", msg.author.name, e);
            pending
                .edit(&ctx.http, |m| {
                    m.content(e.user_notice("bullets", &mention, &app.operator_mention))
                })
                .await?;
        }
    }

    Ok(())
}

/// One completion call, no hidden state between invocations.
pub(crate) async fn run_revise(
    completer: &dyn Complete,
    bullets: &str,
) -> Result<String, BotError> {
    completer.complete(&revise_prompt(bullets)).await
}

pub(crate) fn revised_message(mention: &str, feedback: &str) -> String {
    format!(
        "🤖 Here are your revised bullets {}:\n\n{}",
        mention, feedback
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoCompleter;

    #[async_trait]
    impl Complete for EchoCompleter {
        async fn complete(&self, system_prompt: &str) -> Result<String, BotError> {
            Ok(format!("revised: {}", system_prompt.len()))
        }
    }

    struct FailingCompleter;

    #[async_trait]
    impl Complete for FailingCompleter {
        async fn complete(&self, _system_prompt: &str) -> Result<String, BotError> {
            Err(BotError::Completion { status: 500 })
        }
    }

    #[tokio::test]
    async fn identical_input_yields_identical_output() {
        let first = run_revise(&EchoCompleter, "Did stuff").await.unwrap();
        let second = run_revise(&EchoCompleter, "Did stuff").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn completion_failure_maps_to_the_fixed_notice() {
        let err = run_revise(&FailingCompleter, "Did stuff").await.unwrap_err();
        let final_message = err.user_notice("bullets", "@user", "<@129678295057956864>");
        assert_eq!(
            final_message,
            "⚠️ There was an error processing your bullets @user. <@129678295057956864> will look into it."
        );
    }

    #[test]
    fn revised_message_greets_the_user() {
        assert_eq!(
            revised_message("@user", "- Shipped X"),
            "🤖 Here are your revised bullets @user:\n\n- Shipped X"
        );
    }
}
