//! Telegram rendering of wizard prompts and outcomes.

use async_trait::async_trait;
use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::utils::datetime::format_datetime;
use crate::utils::feedback::{CommandFeedback, FeedbackType};
use crate::utils::markdown::{bold, escape_markdown};
use crate::wizard::error::ValidationError;
use crate::wizard::flows;
use crate::wizard::gateway::PresentationGateway;
use crate::wizard::session::{SessionContext, SessionId};
use crate::wizard::step::{Answers, InputKind, StepDefinition};

/// Callback prefix for picking option `index` of the current step.
pub const CHOICE_PREFIX: &str = "wz";
/// Callback prefix for the cancel button.
pub const CANCEL_PREFIX: &str = "wzc";

/// A button press decoded from callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardCallback {
    /// Option `index` of the step shown at `position`.
    Choose {
        session_id: SessionId,
        position: usize,
        index: usize,
    },
    Cancel { session_id: SessionId },
}

impl WizardCallback {
    /// Decodes `wz:<session>:<position>:<index>` or `wzc:<session>`. Anything
    /// else is not a wizard button.
    pub fn parse(data: &str) -> Option<Self> {
        let parts: Vec<&str> = data.split(':').collect();
        match parts.as_slice() {
            [CHOICE_PREFIX, id, position, index] => Some(WizardCallback::Choose {
                session_id: id.parse().ok()?,
                position: position.parse().ok()?,
                index: index.parse().ok()?,
            }),
            [CANCEL_PREFIX, id] => Some(WizardCallback::Cancel {
                session_id: id.parse().ok()?,
            }),
            _ => None,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            WizardCallback::Choose {
                session_id,
                position,
                index,
            } => format!("{CHOICE_PREFIX}:{session_id}:{position}:{index}"),
            WizardCallback::Cancel { session_id } => format!("{CANCEL_PREFIX}:{session_id}"),
        }
    }
}

/// Builds the MarkdownV2 body of a prompt.
pub fn prompt_text(ctx: &SessionContext, step: &StepDefinition, prior_error: Option<&ValidationError>) -> String {
    let flow = flows::parse_scope_key(&ctx.scope_key).map_or(ctx.scope_key.as_str(), |(flow, _)| flow);
    let mut text = format!(
        "{} \\({}/{}\\)\n\n{}",
        bold(&escape_markdown(&format!("Setup {flow}"))),
        ctx.position + 1,
        ctx.total,
        escape_markdown(&step.prompt)
    );

    if let Some(error) = prior_error {
        text.push_str(&format!("\n\n❌ {}", escape_markdown(&error.to_string())));
    }

    let hint = match &step.input_kind {
        InputKind::SingleChoice { .. } => "Pick one of the buttons below.".to_string(),
        InputKind::MultiChoice { options, min, max } => format!(
            "Reply with {} to {} of: {} (comma separated).",
            min,
            max,
            options.iter().map(|o| o.label.as_str()).collect::<Vec<_>>().join(", ")
        ),
        InputKind::FreeText { max_len } => format!("Reply with up to {max_len} characters."),
        InputKind::ResourceReference { kind } => format!("Reply with a {kind} mention or id."),
    };
    text.push_str(&format!("\n\n_{}_", escape_markdown(&hint)));
    text
}

/// Buttons shown under a prompt: one per option for single choices, plus cancel.
pub fn prompt_keyboard(ctx: &SessionContext, step: &StepDefinition) -> InlineKeyboardMarkup {
    let mut rows = Vec::new();

    if let InputKind::SingleChoice { options } = &step.input_kind {
        for (index, option) in options.iter().enumerate() {
            let data = WizardCallback::Choose {
                session_id: ctx.session_id,
                position: ctx.position,
                index,
            }
            .encode();
            rows.push(vec![InlineKeyboardButton::callback(option.label.clone(), data)]);
        }
    }

    rows.push(vec![InlineKeyboardButton::callback(
        "✖️ Cancel",
        WizardCallback::Cancel {
            session_id: ctx.session_id,
        }
        .encode(),
    )]);

    InlineKeyboardMarkup::new(rows)
}

/// MarkdownV2 summary of saved answers.
pub fn answers_text(answers: &Answers) -> String {
    answers
        .iter()
        .map(|(key, value)| format!("• {}: {}", bold(&escape_markdown(key)), escape_markdown(&value.to_string())))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sends wizard prompts to the chat encoded in the session's scope key.
#[derive(Clone)]
pub struct TelegramPresenter {
    bot: Bot,
}

impl TelegramPresenter {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn feedback(&self, ctx: &SessionContext) -> Option<CommandFeedback> {
        match flows::parse_scope_key(&ctx.scope_key) {
            Some((_, chat_id)) => Some(CommandFeedback::new(self.bot.clone(), ChatId(chat_id))),
            None => {
                tracing::warn!("Cannot render session {}: scope '{}' has no chat", ctx.session_id, ctx.scope_key);
                None
            }
        }
    }
}

#[async_trait]
impl PresentationGateway for TelegramPresenter {
    async fn render(&self, ctx: &SessionContext, step: &StepDefinition, prior_error: Option<&ValidationError>) {
        let Some(feedback) = self.feedback(ctx) else {
            return;
        };
        let text = prompt_text(ctx, step, prior_error);
        if let Err(e) = feedback
            .send_formatted(FeedbackType::Prompt, &text, Some(prompt_keyboard(ctx, step)))
            .await
        {
            tracing::error!("Failed to render step '{}' of session {}: {}", step.key, ctx.session_id, e);
        }
    }

    async fn notify_complete(&self, ctx: &SessionContext, answers: &Answers) {
        let Some(feedback) = self.feedback(ctx) else {
            return;
        };
        let text = format!(
            "{}\n\n{}\n\n_{}_",
            bold(&escape_markdown("Configuration saved")),
            answers_text(answers),
            escape_markdown(&format!("Saved {}", format_datetime(&Utc::now())))
        );
        if let Err(e) = feedback.send_formatted(FeedbackType::Success, &text, None).await {
            tracing::error!("Failed to confirm session {}: {}", ctx.session_id, e);
        }
    }

    async fn notify_cancelled(&self, ctx: &SessionContext) {
        let Some(feedback) = self.feedback(ctx) else {
            return;
        };
        if let Err(e) = feedback.info("Setup cancelled, nothing was saved.").await {
            tracing::error!("Failed to announce cancellation of {}: {}", ctx.session_id, e);
        }
    }

    async fn notify_expired(&self, ctx: &SessionContext) {
        let Some(feedback) = self.feedback(ctx) else {
            return;
        };
        if let Err(e) = feedback.warning("Setup timed out. Run /setup again to start over.").await {
            tracing::error!("Failed to announce expiry of {}: {}", ctx.session_id, e);
        }
    }
}
