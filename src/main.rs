mod completion;
mod config;
mod context;
mod cooldown;
mod error;
mod extract;
mod fetch;
mod help;
mod review;
mod revise;
mod sync;

use std::sync::Arc;

use log::{debug, error, info};
use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    framework::standard::{macros::group, StandardFramework},
    model::application::interaction::{Interaction, InteractionResponseType},
    model::channel::Message,
    model::gateway::Ready,
    model::id::GuildId,
    prelude::GatewayIntents,
};
use tokio::signal;

use crate::config::BotConfig;
use crate::context::AppContext;
use crate::cooldown::Cooldowns;
use crate::help::HELP_COMMAND;
use crate::review::REVIEW_COMMAND;
use crate::revise::REVISE_COMMAND;
use crate::sync::SYNC_COMMAND;

#[group]
#[commands(help, review, revise, sync)]
struct General;

struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        println!("✅ Bot connected as {}!", ready.user.name);

        // Mirror the command tree onto the home guild so the slash UI shows
        // the bot's surface right away.
        let guild_id = {
            let data = ctx.data.read().await;
            data.get::<AppContext>().map(|app| app.guild_id)
        };
        if let Some(guild_id) = guild_id {
            match GuildId(guild_id)
                .set_application_commands(&ctx.http, sync::register_commands)
                .await
            {
                Ok(commands) => info!(
                    "🔄 Registered {} commands on guild {}",
                    commands.len(),
                    guild_id
                ),
                Err(e) => error!("❌ Failed to register commands on guild {}: {}", guild_id, e),
            }
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.id == ctx.cache.current_user_id() {
            debug!("🤖 Bot sent a message");
        } else {
            debug!("💬 Message from {}: {}", msg.author.name, msg.content);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        // The slash entries are discoverability metadata; the actual work
        // runs through the prefix commands.
        if let Interaction::ApplicationCommand(command) = interaction {
            let hint = format!(
                "Use the prefix command `${}` in a channel instead.",
                command.data.name
            );
            if let Err(e) = command
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| message.content(hint))
                })
                .await
            {
                error!("❌ Failed to answer slash interaction: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let config = match BotConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Configuration error: {}", e);
            eprintln!("❌ Configuration error: {}", e);
            eprintln!(
                "Provide DISCORD_TOKEN, OPENAI_KEY and GUILD_ID via botconfig.txt or the environment."
            );
            return;
        }
    };
    println!("🤖 Starting bot with prefix: '{}'", config.prefix);

    let prefix = config.prefix.clone();
    let framework = StandardFramework::new()
        .configure(|c| {
            c.prefix(&prefix)
                .case_insensitivity(true)
                .no_dm_prefix(true)
                .with_whitespace(true)
        })
        .after(|_ctx, msg, command_name, result| {
            Box::pin(async move {
                if let Err(e) = result {
                    error!(
                        "❌ Command '{}' failed for user {} ({}): {:?}",
                        command_name, msg.author.name, msg.author.id, e
                    );
                }
            })
        })
        .group(&GENERAL_GROUP);

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Error creating Discord client: {:?}", e);
            eprintln!("❌ Error creating Discord client: {:?}", e);
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<AppContext>(Arc::new(AppContext::new(&config)));
        data.insert::<Cooldowns>(Cooldowns::new());
    }

    println!("🚀 Bot is running... press Ctrl+C to stop");
    tokio::select! {
        _ = signal::ctrl_c() => {
            println!("\n⏹️ Stopping bot gracefully...");
        }
        result = client.start() => {
            if let Err(why) = result {
                error!("❌ Client error: {:?}", why);
                eprintln!("❌ Client error: {:?}", why);
            }
        }
    }

    println!("✅ Bot stopped");
}
