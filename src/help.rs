use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
    utils::Colour,
};

#[command]
pub async fn help(ctx: &Context, msg: &Message, _args: Args) -> CommandResult {
    msg.channel_id
        .send_message(&ctx.http, |m| {
            m.embed(|e| {
                e.title("Help")
                    .description("List of commands for the bot")
                    .colour(Colour::BLUE)
                    .field(
                        "$review",
                        "Attach a PDF of your resume and the bot will give you feedback on how to improve it.",
                        false,
                    )
                    .field(
                        "$revise",
                        "Send the bot a list of bullet points and it will revise them for you.",
                        false,
                    )
            })
        })
        .await?;
    Ok(())
}
