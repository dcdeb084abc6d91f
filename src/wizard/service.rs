//! Async orchestration around [`WizardController`].
//!
//! Controller calls are synchronous and hold session locks only for their own
//! duration; every gateway call happens after they return.

use chrono::Duration;
use std::sync::Arc;

use super::controller::{StepResult, WizardController};
use super::error::{WizardError, WizardResult};
use super::flows;
use super::gateway::{PersistenceGateway, PresentationGateway};
use super::session::{SessionContext, SessionId};
use super::step::{Answers, RawInput, StepDefinition};
use crate::utils::logging::{log_database_error, log_database_operation};

/// Wires the controller to its persistence and presentation gateways.
pub struct WizardService {
    controller: Arc<WizardController>,
    persistence: Arc<dyn PersistenceGateway>,
    presentation: Arc<dyn PresentationGateway>,
    ttl: Duration,
}

impl WizardService {
    pub fn new(
        controller: Arc<WizardController>,
        persistence: Arc<dyn PersistenceGateway>,
        presentation: Arc<dyn PresentationGateway>,
        ttl: Duration,
    ) -> Self {
        Self {
            controller,
            persistence,
            presentation,
            ttl,
        }
    }

    pub fn controller(&self) -> &Arc<WizardController> {
        &self.controller
    }

    /// Starts an arbitrary wizard and renders its first step.
    pub async fn start(
        &self,
        steps: Vec<StepDefinition>,
        initiator: u64,
        scope_key: &str,
    ) -> WizardResult<SessionContext> {
        let session = self.controller.start(steps, initiator, scope_key, self.ttl)?;
        let ctx = session.context();
        if let Some(step) = session.current_step() {
            self.presentation.render(&ctx, step, None).await;
        }
        Ok(ctx)
    }

    /// Starts one of the built-in setup flows for `target`.
    ///
    /// Plain replies are routed by chat, so a user may run only one flow per
    /// target at a time.
    pub async fn start_flow(&self, flow: &str, initiator: u64, target: i64) -> WizardResult<SessionContext> {
        let steps = flows::by_name(flow)
            .ok_or_else(|| WizardError::InvalidDefinition(format!("unknown setup flow '{flow}'")))?;

        let running = self.controller.sessions_for(initiator).into_iter().find(|s| {
            flows::parse_scope_key(&s.context.scope_key).is_some_and(|(_, running_target)| running_target == target)
        });
        if let Some(running) = running {
            return Err(WizardError::DuplicateSession {
                scope_key: running.context.scope_key,
                existing: running.context.session_id,
            });
        }
        self.start(steps, initiator, &flows::scope_key(flow, target)).await
    }

    /// Feeds one response to the session and reacts to the outcome.
    ///
    /// On the last step the answers are saved; if saving fails the session is
    /// kept so [`WizardService::retry_save`] can try again.
    pub async fn submit(&self, id: SessionId, responder: u64, raw: &RawInput) -> WizardResult<StepResult> {
        let result = self.controller.submit(id, responder, raw)?;
        self.react(result).await
    }

    /// Submits an answer bound to the step at `position`, as button presses are.
    pub async fn submit_step(
        &self,
        id: SessionId,
        responder: u64,
        position: usize,
        raw: &RawInput,
    ) -> WizardResult<StepResult> {
        let result = self.controller.submit_step(id, responder, position, raw)?;
        self.react(result).await
    }

    async fn react(&self, result: StepResult) -> WizardResult<StepResult> {
        match &result {
            StepResult::Retry { context, step, error } => {
                self.presentation.render(context, step, Some(error)).await;
            }
            StepResult::Advance { context, step } => {
                self.presentation.render(context, step, None).await;
            }
            StepResult::Complete { context, answers } => {
                self.persist(context, answers).await?;
            }
        }
        Ok(result)
    }

    /// Saves a session left pending by an earlier storage failure.
    pub async fn retry_save(&self, id: SessionId) -> WizardResult<Answers> {
        let (context, answers) = self.controller.pending_save(id)?;
        self.persist(&context, &answers).await?;
        Ok(answers)
    }

    /// Cancels the session. Returns `false` when there was nothing to cancel.
    pub async fn cancel(&self, id: SessionId, requester: u64) -> WizardResult<bool> {
        match self.controller.cancel(id, requester)? {
            Some(context) => {
                self.presentation.notify_cancelled(&context).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Reclaims expired sessions and tells their users.
    pub async fn sweep(&self) -> usize {
        let expired = self.controller.sweep_expired();
        for summary in &expired {
            self.presentation.notify_expired(&summary.context).await;
        }
        expired.len()
    }

    async fn persist(&self, context: &SessionContext, answers: &Answers) -> WizardResult<()> {
        log_database_operation("SAVE", "wizard_configs", Some(&context.scope_key));

        if let Err(e) = self.persistence.save(&context.scope_key, answers, context.initiator).await {
            log_database_error("SAVE", "wizard_configs", &e.to_string(), Some(&context.scope_key));
            return Err(WizardError::Storage(e));
        }

        self.controller.finish(context.session_id);
        self.presentation.notify_complete(context, answers).await;
        Ok(())
    }
}
