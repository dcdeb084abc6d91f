use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::wizard::service::WizardService;

/// Periodically reclaims wizard sessions nobody finished.
///
/// Expiry is also enforced lazily on every access; the sweep only frees
/// memory held by abandoned sessions and lets their users know.
pub struct SweepService {
    wizards: Arc<WizardService>,
    scheduler: JobScheduler,
    schedule: String,
}

impl SweepService {
    pub async fn new(
        wizards: Arc<WizardService>,
        schedule: &str,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            wizards,
            scheduler,
            schedule: schedule.to_string(),
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let wizards = self.wizards.clone();

        let sweep_job = Job::new_async(self.schedule.as_str(), move |_uuid, _l| {
            let wizards = wizards.clone();
            Box::pin(async move {
                let reclaimed = wizards.sweep().await;
                if reclaimed > 0 {
                    tracing::info!("Sweep reclaimed {} expired wizard sessions", reclaimed);
                }
            })
        })?;

        self.scheduler.add(sweep_job).await?;
        self.scheduler.start().await?;

        tracing::info!("Sweep service started with schedule '{}'", self.schedule);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    /// Runs one sweep immediately.
    pub async fn sweep_now(&self) -> usize {
        self.wizards.sweep().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::controller::{ManualClock, WizardController};
    use crate::wizard::error::{StorageError, ValidationError};
    use crate::wizard::gateway::{PersistenceGateway, PresentationGateway};
    use crate::wizard::session::SessionContext;
    use crate::wizard::step::{Answers, StepDefinition};
    use async_trait::async_trait;
    use chrono::{Duration, Utc};

    struct Silent;

    #[async_trait]
    impl PersistenceGateway for Silent {
        async fn save(&self, _scope_key: &str, _answers: &Answers, _saved_by: u64) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[async_trait]
    impl PresentationGateway for Silent {
        async fn render(&self, _ctx: &SessionContext, _step: &StepDefinition, _prior_error: Option<&ValidationError>) {}
        async fn notify_complete(&self, _ctx: &SessionContext, _answers: &Answers) {}
        async fn notify_cancelled(&self, _ctx: &SessionContext) {}
    }

    fn wizards(clock: Arc<ManualClock>) -> Arc<WizardService> {
        let controller = Arc::new(WizardController::with_clock(clock));
        Arc::new(WizardService::new(
            controller,
            Arc::new(Silent),
            Arc::new(Silent),
            Duration::minutes(15),
        ))
    }

    #[tokio::test]
    async fn test_sweep_now_reclaims_expired_sessions() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let wizards = wizards(clock.clone());
        wizards
            .start(vec![StepDefinition::free_text("title", "Title?", 10)], 1, "suggestions:1")
            .await
            .expect("Failed to start wizard");

        let service = SweepService::new(wizards.clone(), "0 */5 * * * *")
            .await
            .expect("Failed to create sweep service");

        assert_eq!(service.sweep_now().await, 0);
        clock.advance(Duration::minutes(16));
        assert_eq!(service.sweep_now().await, 1);
        assert_eq!(wizards.controller().live_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_schedule_fails_to_start() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let mut service = SweepService::new(wizards(clock), "every now and then")
            .await
            .expect("Failed to create sweep service");

        assert!(service.start().await.is_err());
    }
}
