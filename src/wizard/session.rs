use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::error::{WizardError, WizardResult};
use super::step::{Answers, StepDefinition};

/// Opaque identifier of one in-flight wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the next answer.
    Active,
    /// Every step answered; waiting for persistence to confirm.
    Completed,
    /// Discarded by its initiator.
    Cancelled,
    /// Left unanswered past its deadline.
    Expired,
}

/// One guided configuration attempt.
#[derive(Debug, Clone)]
pub struct WizardSession {
    pub id: SessionId,
    pub initiator: u64,
    pub scope_key: String,
    pub steps: Vec<StepDefinition>,
    pub cursor: usize,
    pub answers: Answers,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl WizardSession {
    pub(crate) fn new(
        steps: Vec<StepDefinition>,
        initiator: u64,
        scope_key: String,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> WizardResult<Self> {
        Ok(Self {
            id: SessionId::new(),
            initiator,
            scope_key,
            steps,
            cursor: 0,
            answers: Answers::new(),
            state: SessionState::Active,
            created_at: now,
            expires_at: deadline(now, ttl)?,
            ttl,
        })
    }

    /// A session at exactly `expires_at` is still live.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Every step has an answer.
    pub fn is_complete(&self) -> bool {
        self.cursor == self.steps.len()
    }

    /// Step awaiting an answer, if any.
    pub fn current_step(&self) -> Option<&StepDefinition> {
        self.steps.get(self.cursor)
    }

    /// Pushes the deadline one ttl past `now`.
    pub(crate) fn rearm(&mut self, now: DateTime<Utc>) -> WizardResult<()> {
        self.expires_at = deadline(now, self.ttl)?;
        Ok(())
    }

    /// Addressing data for gateways.
    pub fn context(&self) -> SessionContext {
        SessionContext {
            session_id: self.id,
            initiator: self.initiator,
            scope_key: self.scope_key.clone(),
            position: self.cursor,
            total: self.steps.len(),
        }
    }

    /// Read-only view for listings and sweeps.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            context: self.context(),
            state: self.state,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

fn deadline(now: DateTime<Utc>, ttl: Duration) -> WizardResult<DateTime<Utc>> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| WizardError::InvalidDefinition(format!("ttl of {ttl} is out of range")))
}

/// What a presentation gateway needs to address a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: SessionId,
    pub initiator: u64,
    pub scope_key: String,
    /// Zero-based index of the step being shown.
    pub position: usize,
    pub total: usize,
}

/// Read-only snapshot of a live session.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub context: SessionContext,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
