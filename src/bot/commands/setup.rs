use chrono::Utc;
use teloxide::prelude::*;

use crate::bot::handlers::{describe_error, BotHandler, HandlerResult};
use crate::utils::datetime::format_remaining;
use crate::utils::feedback::{CommandFeedback, FeedbackType};
use crate::utils::logging::{log_command_error, log_command_start};
use crate::utils::validation::{validate_flow_name, validate_telegram_chat_id};
use crate::utils::markdown::{bold, escape_markdown};
use crate::wizard::session::{SessionState, SessionSummary};

pub async fn handle_setup(bot: Bot, msg: Message, flow: String, handler: &BotHandler) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let username = user.username.as_deref().unwrap_or("unknown");

    log_command_start("setup", username, user.id.0, chat_id, Some(&flow));

    if let Err(e) = validate_telegram_chat_id(chat_id) {
        feedback
            .validation_error(
                &format!("Invalid chat configuration: {e}"),
                "Run /setup from the chat you want to configure.",
            )
            .await?;
        return Ok(());
    }

    let flow = match validate_flow_name(&flow) {
        Ok(flow) => flow,
        Err(e) => {
            feedback
                .validation_error(&e.to_string(), "Example: /setup ticket")
                .await?;
            return Ok(());
        }
    };

    match handler.wizards.start_flow(flow, user.id.0, chat_id).await {
        Ok(ctx) => {
            tracing::info!("Setup '{}' started as session {} in chat {}", flow, ctx.session_id, chat_id);
        }
        Err(e) => {
            log_command_error("setup", username, user.id.0, chat_id, &e.to_string());
            feedback.error(&describe_error(&e)).await?;
        }
    }

    Ok(())
}

pub async fn handle_cancel(bot: Bot, msg: Message, handler: &BotHandler) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some(user) = msg.from() else {
        return Ok(());
    };

    let Some(session) = handler.session_in_chat(
        user.id.0,
        chat_id,
        &[SessionState::Active, SessionState::Completed],
    ) else {
        feedback.info("You have no setup running in this chat.").await?;
        return Ok(());
    };

    match handler.wizards.cancel(session.context.session_id, user.id.0).await {
        Ok(true) => {}
        Ok(false) => {
            feedback.info("That setup had already ended.").await?;
        }
        Err(e) => {
            feedback.error(&describe_error(&e)).await?;
        }
    }

    Ok(())
}

pub async fn handle_retry(bot: Bot, msg: Message, handler: &BotHandler) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some(user) = msg.from() else {
        return Ok(());
    };

    let Some(session) = handler.session_in_chat(user.id.0, chat_id, &[SessionState::Completed]) else {
        feedback.info("There is no finished setup waiting to be saved.").await?;
        return Ok(());
    };

    if let Err(e) = handler.wizards.retry_save(session.context.session_id).await {
        let username = user.username.as_deref().unwrap_or("unknown");
        log_command_error("retry", username, user.id.0, chat_id, &e.to_string());
        feedback.error(&describe_error(&e)).await?;
    }

    Ok(())
}

pub async fn handle_status(bot: Bot, msg: Message, handler: &BotHandler) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);
    let Some(user) = msg.from() else {
        return Ok(());
    };

    let sessions = handler.wizards.controller().sessions_for(user.id.0);
    if sessions.is_empty() {
        feedback.info("You have no setup running.").await?;
        return Ok(());
    }

    let now = Utc::now();
    let lines: Vec<String> = sessions.iter().map(|s| status_line(s, &now)).collect();
    let text = format!("{}\n\n{}", bold("Your setups"), lines.join("\n"));
    feedback.send_formatted(FeedbackType::Info, &text, None).await?;
    Ok(())
}

fn status_line(summary: &SessionSummary, now: &chrono::DateTime<Utc>) -> String {
    let ctx = &summary.context;
    let progress = match summary.state {
        SessionState::Completed => "waiting to be saved, use /retry".to_string(),
        _ => format!("step {}/{}", ctx.position + 1, ctx.total),
    };
    format!(
        "• {}: {}, expires in {}",
        bold(&escape_markdown(&ctx.scope_key)),
        escape_markdown(&progress),
        escape_markdown(&format_remaining(&summary.expires_at, now))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::session::{SessionContext, SessionId};
    use chrono::Duration;

    fn summary(state: SessionState, position: usize) -> SessionSummary {
        let now = Utc::now();
        SessionSummary {
            context: SessionContext {
                session_id: SessionId::new(),
                initiator: 1,
                scope_key: "voice:-100".to_string(),
                position,
                total: 3,
            },
            state,
            created_at: now,
            expires_at: now + Duration::minutes(14),
        }
    }

    #[test]
    fn test_status_line_for_active_session() {
        let s = summary(SessionState::Active, 1);
        let line = status_line(&s, &s.created_at);
        assert_eq!(line, "• *voice:\\-100*: step 2/3, expires in 14 min");
    }

    #[test]
    fn test_status_line_for_pending_save() {
        let s = summary(SessionState::Completed, 3);
        let line = status_line(&s, &s.created_at);
        assert!(line.contains("/retry"));
    }
}
