use log::{info, warn};
use serenity::{
    builder::CreateApplicationCommands,
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::application::command::Command,
    model::channel::Message,
    model::id::GuildId,
};

/// Application-command metadata for the bot's surface. The real work happens
/// through the prefix commands; these entries make the commands discoverable
/// in Discord's slash UI.
pub fn register_commands(
    commands: &mut CreateApplicationCommands,
) -> &mut CreateApplicationCommands {
    commands
        .create_application_command(|c| c.name("help").description("List the bot's commands"))
        .create_application_command(|c| {
            c.name("review")
                .description("Attach a PDF of your resume for feedback")
        })
        .create_application_command(|c| {
            c.name("revise").description("Revise resume bullet points")
        })
}

/// `$sync [guild ids] [~|*|^]` — owner-only command tree synchronization.
///
/// With no arguments the tree is pushed globally. `~` pushes it to the
/// current guild, `*` copies the global set to the current guild, `^` clears
/// the current guild's tree. Explicit guild ids push the tree to each listed
/// guild instead.
#[command]
#[aliases("synccommands")]
pub async fn sync(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let app_info = ctx.http.get_current_application_info().await?;
    if msg.author.id != app_info.owner.id {
        msg.reply(ctx, "❌ Only the bot owner can sync the command tree.")
            .await?;
        return Ok(());
    }
    let current_guild = match msg.guild_id {
        Some(guild) => guild,
        None => {
            msg.reply(ctx, "This command only works inside a guild.")
                .await?;
            return Ok(());
        }
    };

    let (guilds, spec) = parse_sync_args(args.message());

    if guilds.is_empty() {
        let reply = match spec {
            Some('~') | Some('*') => {
                // `~` pushes our own tree, `*` copies the global set; both
                // land the same command list on the current guild.
                let synced = current_guild
                    .set_application_commands(&ctx.http, register_commands)
                    .await?;
                info!("🔄 Synced {} commands to guild {}", synced.len(), current_guild);
                format!("Synced {} commands to the current guild.", synced.len())
            }
            Some('^') => {
                current_guild
                    .set_application_commands(&ctx.http, |commands| commands)
                    .await?;
                info!("🔄 Cleared command tree for guild {}", current_guild);
                "Synced 0 commands to the current guild.".to_string()
            }
            _ => {
                let synced =
                    Command::set_global_application_commands(&ctx.http, register_commands)
                        .await?;
                info!("🔄 Synced {} commands globally", synced.len());
                format!("Synced {} commands globally", synced.len())
            }
        };
        msg.reply(ctx, reply).await?;
        return Ok(());
    }

    let mut synced = 0usize;
    for guild in &guilds {
        match GuildId(*guild)
            .set_application_commands(&ctx.http, register_commands)
            .await
        {
            Ok(_) => synced += 1,
            Err(e) => warn!("⚠️ Failed to sync tree to guild {}: {}", guild, e),
        }
    }
    msg.reply(ctx, format!("Synced the tree to {}/{}.", synced, guilds.len()))
        .await?;

    Ok(())
}

/// Split the trailing arguments into explicit guild ids and an optional
/// sync-mode character.
fn parse_sync_args(raw: &str) -> (Vec<u64>, Option<char>) {
    let mut guilds = Vec::new();
    let mut spec = None;
    for token in raw.split_whitespace() {
        match token {
            "~" | "*" | "^" => spec = token.chars().next(),
            other => {
                if let Ok(id) = other.parse::<u64>() {
                    guilds.push(id);
                }
            }
        }
    }
    (guilds, spec)
}
