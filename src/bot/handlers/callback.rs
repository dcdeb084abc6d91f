use teloxide::prelude::*;

use super::{describe_error, BotHandler, HandlerResult};
use crate::bot::presenter::WizardCallback;
use crate::wizard::error::WizardError;
use crate::wizard::service::WizardService;
use crate::wizard::session::SessionId;
use crate::wizard::step::RawInput;

pub async fn callback_handler(bot: Bot, q: CallbackQuery, handler: BotHandler) -> HandlerResult {
    let user_id = q.from.id.0;
    let username = q.from.username.as_deref().unwrap_or("unknown");

    let Some(callback) = q.data.as_deref().and_then(WizardCallback::parse) else {
        bot.answer_callback_query(q.id).text("Invalid callback data format").await?;
        return Ok(());
    };

    tracing::info!("Callback received: {:?} from user {} ({})", callback, username, user_id);

    let reply = match callback {
        WizardCallback::Choose {
            session_id,
            position,
            index,
        } => match choose(&handler.wizards, session_id, user_id, position, index).await {
            Ok(()) => "👍".to_string(),
            Err(e) => describe_error(&e),
        },
        WizardCallback::Cancel { session_id } => match handler.wizards.cancel(session_id, user_id).await {
            Ok(true) => "Setup cancelled".to_string(),
            Ok(false) => "That setup had already ended".to_string(),
            Err(e) => describe_error(&e),
        },
    };

    bot.answer_callback_query(q.id).text(reply).await?;
    Ok(())
}

/// Resolves the button against the step it was rendered for and submits it.
pub(crate) async fn choose(
    wizards: &WizardService,
    session_id: SessionId,
    user_id: u64,
    position: usize,
    index: usize,
) -> Result<(), WizardError> {
    let (ctx, step) = wizards.controller().current_step(session_id)?;
    if ctx.position != position {
        return Err(WizardError::StaleStep {
            expected: position,
            current: ctx.position,
        });
    }

    let value = step
        .input_kind
        .options()
        .get(index)
        .map(|option| option.value.clone())
        .ok_or(WizardError::UnknownOption { index })?;

    // The position is checked again under the session lock
    wizards
        .submit_step(session_id, user_id, position, &RawInput::Selected(vec![value]))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::controller::WizardController;
    use crate::wizard::error::{StorageError, ValidationError};
    use crate::wizard::gateway::{PersistenceGateway, PresentationGateway};
    use crate::wizard::session::SessionContext;
    use crate::wizard::step::{Answers, ChoiceOption, StepDefinition};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::Arc;

    struct Quiet;

    #[async_trait]
    impl PersistenceGateway for Quiet {
        async fn save(&self, _scope_key: &str, _answers: &Answers, _saved_by: u64) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[async_trait]
    impl PresentationGateway for Quiet {
        async fn render(&self, _ctx: &SessionContext, _step: &StepDefinition, _prior_error: Option<&ValidationError>) {}
        async fn notify_complete(&self, _ctx: &SessionContext, _answers: &Answers) {}
        async fn notify_cancelled(&self, _ctx: &SessionContext) {}
    }

    fn wizards() -> WizardService {
        WizardService::new(
            Arc::new(WizardController::new()),
            Arc::new(Quiet),
            Arc::new(Quiet),
            Duration::minutes(15),
        )
    }

    fn mode_limit_name() -> Vec<StepDefinition> {
        vec![
            StepDefinition::single_choice(
                "mode",
                "Mode?",
                vec![ChoiceOption::new("open", "Open"), ChoiceOption::new("closed", "Closed")],
            ),
            StepDefinition::single_choice(
                "limit",
                "Limit?",
                vec![
                    ChoiceOption::new("0", "No limit"),
                    ChoiceOption::new("2", "2"),
                    ChoiceOption::new("5", "5"),
                ],
            ),
            StepDefinition::free_text("name", "Name?", 10),
        ]
    }

    #[tokio::test]
    async fn test_double_click_does_not_answer_the_next_step() {
        let wizards = wizards();
        let ctx = wizards.start(mode_limit_name(), 1, "voice:-100").await.expect("start");

        choose(&wizards, ctx.session_id, 1, 0, 0).await.expect("first press");
        let second = choose(&wizards, ctx.session_id, 1, 0, 0).await;
        assert!(matches!(second, Err(WizardError::StaleStep { expected: 0, current: 1 })));

        let snapshot = wizards.controller().snapshot(ctx.session_id).expect("session");
        assert_eq!(snapshot.cursor, 1);
        assert!(!snapshot.answers.contains_key("limit"));
    }

    #[tokio::test]
    async fn test_out_of_range_index_is_rejected() {
        let wizards = wizards();
        let ctx = wizards.start(mode_limit_name(), 1, "voice:-100").await.expect("start");
        choose(&wizards, ctx.session_id, 1, 0, 1).await.expect("pick closed");

        // Index 5 must not be read as the "5" option
        let result = choose(&wizards, ctx.session_id, 1, 1, 5).await;
        assert!(matches!(result, Err(WizardError::UnknownOption { index: 5 })));

        let snapshot = wizards.controller().snapshot(ctx.session_id).expect("session");
        assert_eq!(snapshot.cursor, 1);
        assert!(!snapshot.answers.contains_key("limit"));

        choose(&wizards, ctx.session_id, 1, 1, 2).await.expect("pick 5");
        let snapshot = wizards.controller().snapshot(ctx.session_id).expect("session");
        assert_eq!(snapshot.answers.get("limit").map(|v| v.to_string()), Some("5".to_string()));
    }
}
