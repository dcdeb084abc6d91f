use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use super::{BotHandler, HandlerResult};
use crate::bot::commands::{setup, show, Command};

pub async fn command_handler(bot: Bot, msg: Message, cmd: Command, handler: BotHandler) -> HandlerResult {
    match cmd {
        Command::Help => {
            bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
        }
        Command::Start => {
            bot.send_message(
                msg.chat.id,
                "🧭 Welcome to Setup Wizard Bot!\n\nUse /flows to see what can be configured.\nUse /setup <flow> to start a guided setup.",
            )
            .await?;
        }
        Command::Flows => {
            show::handle_flows(bot, msg, &handler).await?;
        }
        Command::Setup { flow } => {
            setup::handle_setup(bot, msg, flow, &handler).await?;
        }
        Command::Cancel => {
            setup::handle_cancel(bot, msg, &handler).await?;
        }
        Command::Retry => {
            setup::handle_retry(bot, msg, &handler).await?;
        }
        Command::Status => {
            setup::handle_status(bot, msg, &handler).await?;
        }
        Command::Show { flow } => {
            show::handle_show(bot, msg, flow, &handler).await?;
        }
    }
    Ok(())
}
