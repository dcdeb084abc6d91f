pub mod callback;
pub mod message;
pub mod text;

use std::sync::Arc;
use teloxide::{dispatching::UpdateHandler, prelude::*};

use crate::bot::commands::Command;
use crate::database::persistence::SqlitePersistence;
use crate::wizard::error::WizardError;
use crate::wizard::flows;
use crate::wizard::service::WizardService;
use crate::wizard::session::{SessionState, SessionSummary};

/// Error type shared by every endpoint.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type HandlerResult = Result<(), HandlerError>;

#[derive(Clone)]
pub struct BotHandler {
    pub wizards: Arc<WizardService>,
    pub store: SqlitePersistence,
}

impl BotHandler {
    pub fn new(wizards: Arc<WizardService>, store: SqlitePersistence) -> Self {
        Self { wizards, store }
    }

    pub fn schema(&self) -> UpdateHandler<HandlerError> {
        let commands = self.clone();
        let texts = self.clone();
        let callbacks = self.clone();

        dptree::entry()
            .branch(
                Update::filter_message()
                    .filter_command::<Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
                        let handler = commands.clone();
                        async move { message::command_handler(bot, msg, cmd, handler).await }
                    }),
            )
            .branch(Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                let handler = texts.clone();
                async move { text::text_handler(bot, msg, handler).await }
            }))
            .branch(Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                let handler = callbacks.clone();
                async move { callback::callback_handler(bot, q, handler).await }
            }))
    }

    /// Newest unexpired session of `user` targeting `chat_id` in one of `states`.
    pub fn session_in_chat(&self, user: u64, chat_id: i64, states: &[SessionState]) -> Option<SessionSummary> {
        self.wizards
            .controller()
            .sessions_for(user)
            .into_iter()
            .find(|s| {
                states.contains(&s.state)
                    && flows::parse_scope_key(&s.context.scope_key).is_some_and(|(_, target)| target == chat_id)
            })
    }
}

/// User-facing text for a rejected wizard operation.
pub fn describe_error(error: &WizardError) -> String {
    match error {
        WizardError::DuplicateSession { scope_key, .. } => format!(
            "You already have a setup running for {scope_key}. Answer it or use /cancel first."
        ),
        WizardError::SessionNotFound(_) => "This setup is no longer running. Use /setup to start again.".to_string(),
        WizardError::SessionExpired(_) => "This setup timed out. Use /setup to start again.".to_string(),
        WizardError::NotOwner => "Only the person who started this setup can answer it.".to_string(),
        WizardError::InvalidDefinition(detail) => format!("This setup cannot run: {detail}"),
        WizardError::StaleStep { .. } => "That button belongs to a step you already answered.".to_string(),
        WizardError::UnknownOption { .. } => "That option is no longer available. Pick one from the latest prompt.".to_string(),
        WizardError::Storage(_) => "The configuration could not be saved. Use /retry to try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::error::StorageError;
    use crate::wizard::session::SessionId;

    #[test]
    fn test_describe_error_points_to_next_action() {
        let storage = WizardError::Storage(StorageError::Unavailable("down".to_string()));
        assert!(describe_error(&storage).contains("/retry"));

        let duplicate = WizardError::DuplicateSession {
            scope_key: "ticket:5".to_string(),
            existing: SessionId::new(),
        };
        assert!(describe_error(&duplicate).contains("/cancel"));
        assert!(describe_error(&WizardError::SessionExpired(SessionId::new())).contains("/setup"));
        assert!(describe_error(&WizardError::StaleStep { expected: 0, current: 1 }).contains("already answered"));
    }
}
