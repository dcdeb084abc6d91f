//! The wizard state machine.
//!
//! [`WizardController`] exclusively owns every live [`WizardSession`]. The
//! table maps ids and `(initiator, scope_key)` pairs to sessions, and each
//! session sits behind its own lock so that two responses racing for the same
//! session are applied one after the other.
//!
//! Lock order is always table, then session. Paths that start from a session
//! lock (submit, cancel) release it before touching the table again.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::error::{ValidationError, WizardError, WizardResult};
use super::session::{SessionContext, SessionId, SessionState, SessionSummary, WizardSession};
use super::step::{Answers, RawInput, StepDefinition, Validated};
use crate::utils::logging::{log_validation_error, log_wizard_end, log_wizard_start, log_wizard_step};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to, for tests and replays.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(start) }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Outcome of a successful `submit` call.
#[derive(Debug, Clone)]
pub enum StepResult {
    /// Input rejected; the same step must be answered again.
    Retry {
        context: SessionContext,
        step: StepDefinition,
        error: ValidationError,
    },
    /// Input accepted; `step` is the next one to render.
    Advance {
        context: SessionContext,
        step: StepDefinition,
    },
    /// Last step accepted. The session waits for its answers to be saved.
    Complete {
        context: SessionContext,
        answers: Answers,
    },
}

type SessionCell = Arc<Mutex<WizardSession>>;

#[derive(Default)]
struct SessionTable {
    by_id: HashMap<SessionId, SessionCell>,
    by_scope: HashMap<(u64, String), SessionId>,
}

impl SessionTable {
    fn remove(&mut self, id: SessionId) -> Option<SessionCell> {
        let cell = self.by_id.remove(&id)?;
        self.by_scope.retain(|_, existing| *existing != id);
        Some(cell)
    }
}

/// Drives wizard sessions from creation to completion or abandonment.
pub struct WizardController {
    table: Mutex<SessionTable>,
    clock: Arc<dyn Clock>,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardController {
    /// Controller on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Controller reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Mutex::new(SessionTable::default()),
            clock,
        }
    }

    /// Opens a session for `(initiator, scope_key)`.
    ///
    /// At most one unexpired session may exist per pair; a stale one is
    /// replaced.
    pub fn start(
        &self,
        steps: Vec<StepDefinition>,
        initiator: u64,
        scope_key: &str,
        ttl: Duration,
    ) -> WizardResult<WizardSession> {
        check_definition(&steps)?;
        if ttl <= Duration::zero() {
            return Err(WizardError::InvalidDefinition("ttl must be positive".to_string()));
        }

        let now = self.clock.now();
        let session = WizardSession::new(steps, initiator, scope_key.to_string(), ttl, now)?;
        let key = (initiator, scope_key.to_string());
        let mut table = self.table.lock();

        if let Some(existing) = table.by_scope.get(&key).copied() {
            let live = table.by_id.get(&existing).is_some_and(|cell| {
                let session = cell.lock();
                matches!(session.state, SessionState::Active | SessionState::Completed)
                    && !session.is_expired(now)
            });
            if live {
                return Err(WizardError::DuplicateSession {
                    scope_key: scope_key.to_string(),
                    existing,
                });
            }
            table.remove(existing);
            log_wizard_end(&existing, scope_key, "replaced");
        }

        let snapshot = session.clone();
        table.by_scope.insert(key, session.id);
        table.by_id.insert(session.id, Arc::new(Mutex::new(session)));

        log_wizard_start(&snapshot.id, scope_key, initiator, snapshot.steps.len());
        Ok(snapshot)
    }

    /// Applies one response from `responder` to the session.
    pub fn submit(&self, id: SessionId, responder: u64, raw: &RawInput) -> WizardResult<StepResult> {
        self.submit_inner(id, responder, None, raw)
    }

    /// Like [`WizardController::submit`], but only if the session is still
    /// waiting on the step at `position`. Button presses carry the position
    /// they were rendered for, so a repeated press fails with `StaleStep`
    /// instead of answering the following step.
    pub fn submit_step(
        &self,
        id: SessionId,
        responder: u64,
        position: usize,
        raw: &RawInput,
    ) -> WizardResult<StepResult> {
        self.submit_inner(id, responder, Some(position), raw)
    }

    fn submit_inner(
        &self,
        id: SessionId,
        responder: u64,
        position: Option<usize>,
        raw: &RawInput,
    ) -> WizardResult<StepResult> {
        let cell = self.lookup(id).ok_or(WizardError::SessionNotFound(id))?;
        let now = self.clock.now();

        let result = {
            let mut session = cell.lock();
            apply(&mut session, responder, position, raw, now)
        };

        if let Err(WizardError::SessionExpired(_)) = &result {
            self.discard(id, &cell);
        }
        result
    }

    /// Discards the session whatever its state.
    ///
    /// Unknown ids are a no-op and return `None`; otherwise the context of the
    /// removed session is returned.
    pub fn cancel(&self, id: SessionId, requester: u64) -> WizardResult<Option<SessionContext>> {
        let Some(cell) = self.lookup(id) else {
            return Ok(None);
        };

        let context = {
            let mut session = cell.lock();
            if session.initiator != requester {
                return Err(WizardError::NotOwner);
            }
            session.state = SessionState::Cancelled;
            session.context()
        };

        if !self.discard(id, &cell) {
            return Ok(None);
        }
        log_wizard_end(&id, &context.scope_key, "cancelled");
        Ok(Some(context))
    }

    /// Step currently awaiting an answer.
    pub fn current_step(&self, id: SessionId) -> WizardResult<(SessionContext, StepDefinition)> {
        let cell = self.lookup(id).ok_or(WizardError::SessionNotFound(id))?;
        let now = self.clock.now();

        let result = {
            let mut session = cell.lock();
            if session.state != SessionState::Active {
                Err(WizardError::SessionNotFound(id))
            } else if session.is_expired(now) {
                session.state = SessionState::Expired;
                Err(WizardError::SessionExpired(id))
            } else {
                session
                    .current_step()
                    .cloned()
                    .map(|step| (session.context(), step))
                    .ok_or(WizardError::SessionNotFound(id))
            }
        };

        if let Err(WizardError::SessionExpired(_)) = &result {
            self.discard(id, &cell);
        }
        result
    }

    /// Answers of a completed session whose save has not been confirmed yet.
    pub fn pending_save(&self, id: SessionId) -> WizardResult<(SessionContext, Answers)> {
        let cell = self.lookup(id).ok_or(WizardError::SessionNotFound(id))?;
        let now = self.clock.now();

        let result = {
            let mut session = cell.lock();
            if session.state != SessionState::Completed {
                Err(WizardError::SessionNotFound(id))
            } else if session.is_expired(now) {
                session.state = SessionState::Expired;
                Err(WizardError::SessionExpired(id))
            } else {
                Ok((session.context(), session.answers.clone()))
            }
        };

        if let Err(WizardError::SessionExpired(_)) = &result {
            self.discard(id, &cell);
        }
        result
    }

    /// Removes a completed session once its answers are safely stored.
    pub fn finish(&self, id: SessionId) -> bool {
        let Some(cell) = self.lookup(id) else {
            return false;
        };
        let scope_key = {
            let session = cell.lock();
            if session.state != SessionState::Completed {
                return false;
            }
            session.scope_key.clone()
        };

        let removed = self.discard(id, &cell);
        if removed {
            log_wizard_end(&id, &scope_key, "completed");
        }
        removed
    }

    /// Unexpired sessions started by `initiator`, newest first.
    pub fn sessions_for(&self, initiator: u64) -> Vec<SessionSummary> {
        let now = self.clock.now();
        let table = self.table.lock();

        let mut sessions: Vec<SessionSummary> = table
            .by_id
            .values()
            .filter_map(|cell| {
                let session = cell.lock();
                (session.initiator == initiator && !session.is_expired(now)).then(|| session.summary())
            })
            .collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sessions
    }

    /// Copy of a live session, expired or not.
    pub fn snapshot(&self, id: SessionId) -> Option<WizardSession> {
        self.lookup(id).map(|cell| cell.lock().clone())
    }

    /// Drops every expired session and returns what was reclaimed.
    pub fn sweep_expired(&self) -> Vec<SessionSummary> {
        let now = self.clock.now();
        let mut table = self.table.lock();

        let expired: Vec<SessionSummary> = table
            .by_id
            .values()
            .filter_map(|cell| {
                let mut session = cell.lock();
                if session.is_expired(now) {
                    session.state = SessionState::Expired;
                    Some(session.summary())
                } else {
                    None
                }
            })
            .collect();

        for summary in &expired {
            table.remove(summary.context.session_id);
            log_wizard_end(&summary.context.session_id, &summary.context.scope_key, "expired");
        }
        expired
    }

    /// Sessions currently held, pending saves included.
    pub fn live_count(&self) -> usize {
        self.table.lock().by_id.len()
    }

    fn lookup(&self, id: SessionId) -> Option<SessionCell> {
        self.table.lock().by_id.get(&id).cloned()
    }

    /// Removes `id` if it still maps to `cell`. Must not be called while the
    /// session lock is held.
    fn discard(&self, id: SessionId, cell: &SessionCell) -> bool {
        let mut table = self.table.lock();
        match table.by_id.get(&id) {
            Some(current) if Arc::ptr_eq(current, cell) => table.remove(id).is_some(),
            _ => false,
        }
    }
}

fn apply(
    session: &mut WizardSession,
    responder: u64,
    position: Option<usize>,
    raw: &RawInput,
    now: DateTime<Utc>,
) -> WizardResult<StepResult> {
    if session.state != SessionState::Active {
        return Err(WizardError::SessionNotFound(session.id));
    }
    if session.is_expired(now) {
        session.state = SessionState::Expired;
        log_wizard_end(&session.id, &session.scope_key, "expired");
        return Err(WizardError::SessionExpired(session.id));
    }
    if session.initiator != responder {
        return Err(WizardError::NotOwner);
    }
    if let Some(expected) = position.filter(|p| *p != session.cursor) {
        return Err(WizardError::StaleStep {
            expected,
            current: session.cursor,
        });
    }

    let step = session
        .current_step()
        .cloned()
        .ok_or(WizardError::SessionNotFound(session.id))?;

    let Validated { value, expanded } = match step.validate(raw) {
        Ok(validated) => validated,
        Err(error) => {
            log_validation_error(&session.scope_key, &step.key, error.code(), session.initiator);
            session.rearm(now)?;
            return Ok(StepResult::Retry {
                context: session.context(),
                step,
                error,
            });
        }
    };

    let mut keys: HashSet<&str> = session.steps.iter().map(|s| s.key.as_str()).collect();
    for generated in &expanded {
        if !keys.insert(generated.key.as_str()) {
            return Err(WizardError::InvalidDefinition(format!(
                "expanded step key '{}' is already in use",
                generated.key
            )));
        }
    }

    session.rearm(now)?;
    session.answers.insert(step.key.clone(), value);
    let at = session.cursor + 1;
    session.steps.splice(at..at, expanded);
    session.cursor = at;

    if session.is_complete() {
        session.state = SessionState::Completed;
        return Ok(StepResult::Complete {
            context: session.context(),
            answers: session.answers.clone(),
        });
    }

    log_wizard_step(&session.id, session.cursor, session.steps.len());
    let next = session
        .current_step()
        .cloned()
        .ok_or(WizardError::SessionNotFound(session.id))?;
    Ok(StepResult::Advance {
        context: session.context(),
        step: next,
    })
}

/// Rejects step lists the controller could not drive safely.
fn check_definition(steps: &[StepDefinition]) -> WizardResult<()> {
    if steps.is_empty() {
        return Err(WizardError::InvalidDefinition("a wizard needs at least one step".to_string()));
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for step in steps {
        if step.key.trim().is_empty() {
            return Err(WizardError::InvalidDefinition("step key cannot be empty".to_string()));
        }
        for dependency in &step.depends_on {
            if !seen.contains(dependency.as_str()) {
                return Err(WizardError::InvalidDefinition(format!(
                    "step '{}' depends on '{}', which is not an earlier step",
                    step.key, dependency
                )));
            }
        }
        if !seen.insert(step.key.as_str()) {
            return Err(WizardError::InvalidDefinition(format!("duplicate step key '{}'", step.key)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::step::{ChoiceOption, ResourceKind};

    fn controller() -> (WizardController, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (WizardController::with_clock(clock.clone()), clock)
    }

    fn two_steps() -> Vec<StepDefinition> {
        vec![
            StepDefinition::reference("channel", "Pick a channel", ResourceKind::Channel),
            StepDefinition::reference("role", "Pick a role", ResourceKind::Role),
        ]
    }

    #[test]
    fn test_check_definition_rejects_bad_lists() {
        assert!(check_definition(&[]).is_err());

        let duplicated = vec![
            StepDefinition::free_text("a", "A", 10),
            StepDefinition::free_text("a", "A again", 10),
        ];
        assert!(check_definition(&duplicated).is_err());

        let dangling = vec![StepDefinition::free_text("a", "A", 10).depends_on(&["b"])];
        assert!(check_definition(&dangling).is_err());

        let forward = vec![
            StepDefinition::free_text("a", "A", 10).depends_on(&["b"]),
            StepDefinition::free_text("b", "B", 10),
        ];
        assert!(check_definition(&forward).is_err());

        let valid = vec![
            StepDefinition::free_text("a", "A", 10),
            StepDefinition::free_text("b", "B", 10).depends_on(&["a"]),
        ];
        assert!(check_definition(&valid).is_ok());
    }

    #[test]
    fn test_ttl_past_the_calendar_is_rejected() {
        let (controller, _) = controller();
        let result = controller.start(two_steps(), 1, "ticket:1", Duration::days(100_000_000));
        assert!(matches!(result, Err(WizardError::InvalidDefinition(_))));
        assert_eq!(controller.live_count(), 0);
    }

    #[test]
    fn test_submit_step_rejects_a_repeated_press() {
        let (controller, _) = controller();
        let steps = vec![
            StepDefinition::single_choice(
                "mode",
                "Mode?",
                vec![ChoiceOption::new("open", "Open"), ChoiceOption::new("closed", "Closed")],
            ),
            StepDefinition::single_choice(
                "limit",
                "Limit?",
                vec![
                    ChoiceOption::new("0", "0"),
                    ChoiceOption::new("2", "2"),
                    ChoiceOption::new("5", "5"),
                ],
            ),
            StepDefinition::free_text("name", "Name?", 10),
        ];
        let session = controller.start(steps, 1, "voice:1", Duration::minutes(5)).unwrap();
        let press = RawInput::Selected(vec!["open".to_string()]);

        assert!(controller.submit_step(session.id, 1, 0, &press).is_ok());
        let again = controller.submit_step(session.id, 1, 0, &press);
        assert!(matches!(again, Err(WizardError::StaleStep { expected: 0, current: 1 })));

        let snapshot = controller.snapshot(session.id).unwrap();
        assert_eq!(snapshot.cursor, 1);
        assert_eq!(snapshot.answers.len(), 1);
        assert!(!snapshot.answers.contains_key("limit"));
    }

    #[test]
    fn test_non_positive_ttl_rejected() {
        let (controller, _) = controller();
        let result = controller.start(two_steps(), 1, "ticket:1", Duration::zero());
        assert!(matches!(result, Err(WizardError::InvalidDefinition(_))));
        assert_eq!(controller.live_count(), 0);
    }

    #[test]
    fn test_stranger_cannot_submit() {
        let (controller, _) = controller();
        let session = controller.start(two_steps(), 1, "ticket:1", Duration::minutes(5)).unwrap();

        let result = controller.submit(session.id, 2, &RawInput::from("<#10>"));
        assert!(matches!(result, Err(WizardError::NotOwner)));
        assert_eq!(controller.snapshot(session.id).unwrap().cursor, 0);
    }

    #[test]
    fn test_retry_rearms_expiry() {
        let (controller, clock) = controller();
        let session = controller.start(two_steps(), 1, "ticket:1", Duration::minutes(5)).unwrap();

        clock.advance(Duration::minutes(4));
        let result = controller.submit(session.id, 1, &RawInput::from("nope")).unwrap();
        assert!(matches!(result, StepResult::Retry { .. }));

        // Would have expired without the re-arm
        clock.advance(Duration::minutes(4));
        let result = controller.submit(session.id, 1, &RawInput::from("<#10>")).unwrap();
        assert!(matches!(result, StepResult::Advance { .. }));
    }

    #[test]
    fn test_expired_session_can_be_restarted() {
        let (controller, clock) = controller();
        let first = controller.start(two_steps(), 1, "ticket:1", Duration::minutes(5)).unwrap();

        clock.advance(Duration::minutes(6));
        let second = controller.start(two_steps(), 1, "ticket:1", Duration::minutes(5)).unwrap();

        assert_ne!(first.id, second.id);
        assert!(controller.snapshot(first.id).is_none());
        assert_eq!(controller.live_count(), 1);
    }

    #[test]
    fn test_finish_only_removes_completed_sessions() {
        let (controller, _) = controller();
        let session = controller.start(two_steps(), 1, "ticket:1", Duration::minutes(5)).unwrap();

        assert!(!controller.finish(session.id));
        controller.submit(session.id, 1, &RawInput::from("<#10>")).unwrap();
        controller.submit(session.id, 1, &RawInput::from("<@&20>")).unwrap();

        assert!(controller.pending_save(session.id).is_ok());
        assert!(controller.finish(session.id));
        assert_eq!(controller.live_count(), 0);
    }

    #[test]
    fn test_sweep_reclaims_only_expired() {
        let (controller, clock) = controller();
        let old = controller.start(two_steps(), 1, "ticket:1", Duration::minutes(5)).unwrap();
        clock.advance(Duration::minutes(3));
        let fresh = controller.start(two_steps(), 1, "voice:1", Duration::minutes(5)).unwrap();
        clock.advance(Duration::minutes(3));

        let swept = controller.sweep_expired();
        assert_eq!(swept.len(), 1);
        assert_eq!(swept[0].context.session_id, old.id);
        assert_eq!(swept[0].state, SessionState::Expired);
        assert!(controller.snapshot(fresh.id).is_some());
        assert_eq!(controller.live_count(), 1);
    }

    #[test]
    fn test_sessions_for_lists_newest_first() {
        let (controller, clock) = controller();
        controller.start(two_steps(), 1, "ticket:1", Duration::minutes(5)).unwrap();
        clock.advance(Duration::seconds(1));
        let newer = controller.start(two_steps(), 1, "voice:1", Duration::minutes(5)).unwrap();
        controller.start(two_steps(), 2, "ticket:1", Duration::minutes(5)).unwrap();

        let sessions = controller.sessions_for(1);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].context.session_id, newer.id);
    }
}
