//! Boundaries the wizard core calls through, never directly.

use async_trait::async_trait;

use super::error::{StorageError, ValidationError};
use super::session::SessionContext;
use super::step::{Answers, StepDefinition};

/// Stores finished configurations.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Writes the answers for `scope_key`. Saving identical answers twice
    /// must leave the store unchanged.
    async fn save(&self, scope_key: &str, answers: &Answers, saved_by: u64) -> Result<(), StorageError>;
}

/// Shows prompts and outcomes to the user.
///
/// Every method is fire-and-forget: implementations log their own failures.
#[async_trait]
pub trait PresentationGateway: Send + Sync {
    /// Shows `step`, annotated with the last validation error if any.
    async fn render(&self, ctx: &SessionContext, step: &StepDefinition, prior_error: Option<&ValidationError>);

    async fn notify_complete(&self, ctx: &SessionContext, answers: &Answers);

    async fn notify_cancelled(&self, ctx: &SessionContext);

    /// Called when a session is reclaimed after its ttl elapsed.
    async fn notify_expired(&self, _ctx: &SessionContext) {}
}
