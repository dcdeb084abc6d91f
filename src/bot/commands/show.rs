use teloxide::prelude::*;

use crate::bot::handlers::{BotHandler, HandlerResult};
use crate::bot::presenter::answers_text;
use crate::utils::feedback::{CommandFeedback, FeedbackType};
use crate::utils::markdown::{bold, escape_markdown};
use crate::utils::validation::validate_flow_name;
use crate::wizard::flows;

pub async fn handle_flows(bot: Bot, msg: Message, handler: &BotHandler) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);

    let saved = match handler.store.saved_flows(msg.chat.id.0).await {
        Ok(saved) => saved,
        Err(e) => {
            tracing::warn!("Could not list saved flows for chat {}: {}", msg.chat.id, e);
            Vec::new()
        }
    };

    let lines: Vec<String> = flows::names()
        .iter()
        .map(|flow| {
            let marker = if saved.iter().any(|s| s == flow) { " ✅" } else { "" };
            format!(
                "• {}{} {}",
                bold(&escape_markdown(flow)),
                marker,
                escape_markdown(flows::describe(flow).unwrap_or_default())
            )
        })
        .collect();

    let text = format!(
        "{}\n\n{}\n\n{}",
        bold("Available setups"),
        lines.join("\n"),
        escape_markdown("Start one with /setup <flow>. ✅ marks flows already configured here.")
    );
    feedback.send_formatted(FeedbackType::Info, &text, None).await?;
    Ok(())
}

pub async fn handle_show(bot: Bot, msg: Message, flow: String, handler: &BotHandler) -> HandlerResult {
    let feedback = CommandFeedback::new(bot, msg.chat.id);

    let flow = match validate_flow_name(&flow) {
        Ok(flow) => flow,
        Err(e) => {
            feedback.validation_error(&e.to_string(), "Example: /show ticket").await?;
            return Ok(());
        }
    };

    let scope_key = flows::scope_key(flow, msg.chat.id.0);
    match handler.store.load(&scope_key).await {
        Ok(Some(answers)) => {
            let text = format!(
                "{}\n\n{}",
                bold(&escape_markdown(&format!("Saved {flow} configuration"))),
                answers_text(&answers)
            );
            feedback.send_formatted(FeedbackType::Info, &text, None).await?;
        }
        Ok(None) => {
            feedback
                .info(&format!("No {flow} configuration saved yet. Use /setup {flow} to create one."))
                .await?;
        }
        Err(e) => {
            tracing::error!("Failed to load configuration {}: {}", scope_key, e);
            feedback.error("Could not read the saved configuration.").await?;
        }
    }

    Ok(())
}
