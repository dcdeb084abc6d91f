use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, ParseMode};

use crate::utils::markdown::escape_markdown;

/// Feedback types for different command outcomes
#[derive(Debug, Clone, Copy)]
pub enum FeedbackType {
    Success,
    Warning,
    Error,
    Info,
    Prompt,
}

impl FeedbackType {
    pub(crate) fn emoji(&self) -> &'static str {
        match self {
            FeedbackType::Success => "✅",
            FeedbackType::Warning => "⚠️",
            FeedbackType::Error => "❌",
            FeedbackType::Info => "ℹ️",
            FeedbackType::Prompt => "🧭",
        }
    }
}

/// Centralized feedback system for bot commands and wizard prompts
#[derive(Clone)]
pub struct CommandFeedback {
    bot: Bot,
    chat_id: ChatId,
}

impl CommandFeedback {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    /// Send plain text, escaped and prefixed with the feedback emoji
    pub async fn send(&self, feedback_type: FeedbackType, message: &str) -> ResponseResult<Message> {
        self.send_formatted(feedback_type, &escape_markdown(message), None).await
    }

    /// Send text that is already valid MarkdownV2, optionally with buttons
    pub async fn send_formatted(
        &self,
        feedback_type: FeedbackType,
        formatted: &str,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> ResponseResult<Message> {
        let text = format!("{} {}", feedback_type.emoji(), formatted);
        let request = self
            .bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::MarkdownV2);

        match keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await,
            None => request.await,
        }
    }

    pub async fn error(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Error, message).await
    }

    pub async fn warning(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Warning, message).await
    }

    pub async fn info(&self, message: &str) -> ResponseResult<Message> {
        self.send(FeedbackType::Info, message).await
    }

    /// Send validation error with helpful suggestion
    pub async fn validation_error(&self, error: &str, suggestion: &str) -> ResponseResult<Message> {
        let message = format!(
            "{}\n\n💡 *Suggestion:* {}",
            escape_markdown(error),
            escape_markdown(suggestion)
        );
        self.send_formatted(FeedbackType::Error, &message, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_type_emojis() {
        assert_eq!(FeedbackType::Success.emoji(), "✅");
        assert_eq!(FeedbackType::Warning.emoji(), "⚠️");
        assert_eq!(FeedbackType::Error.emoji(), "❌");
        assert_eq!(FeedbackType::Info.emoji(), "ℹ️");
        assert_eq!(FeedbackType::Prompt.emoji(), "🧭");
    }
}
