use teloxide::prelude::*;

use super::{describe_error, BotHandler, HandlerResult};
use crate::utils::feedback::CommandFeedback;
use crate::wizard::session::SessionState;
use crate::wizard::step::RawInput;

/// Plain messages answer the sender's running setup in this chat, if any.
pub async fn text_handler(bot: Bot, msg: Message, handler: BotHandler) -> HandlerResult {
    let (Some(text), Some(user)) = (msg.text(), msg.from()) else {
        return Ok(());
    };

    if text.starts_with('/') {
        let feedback = CommandFeedback::new(bot, msg.chat.id);
        let error_msg = format!("Unknown command: {}", text.split_whitespace().next().unwrap_or(text));
        feedback
            .validation_error(&error_msg, "Use /help to see all available commands.")
            .await?;
        return Ok(());
    }

    // Not answering a setup: stay quiet to avoid spam
    let Some(session) = handler.session_in_chat(user.id.0, msg.chat.id.0, &[SessionState::Active]) else {
        return Ok(());
    };

    let result = handler
        .wizards
        .submit(session.context.session_id, user.id.0, &RawInput::Text(text.to_string()))
        .await;

    if let Err(e) = result {
        tracing::warn!("Answer to session {} rejected: {}", session.context.session_id, e);
        CommandFeedback::new(bot, msg.chat.id).error(&describe_error(&e)).await?;
    }

    Ok(())
}
