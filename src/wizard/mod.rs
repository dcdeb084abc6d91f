//! Guided multi-step setup wizards.
//!
//! A wizard is a fixed list of [`StepDefinition`]s answered one at a time by
//! the user who started it. [`WizardController`] owns the sessions and their
//! transitions; [`WizardService`] connects it to a [`PersistenceGateway`] and
//! a [`PresentationGateway`].

pub mod controller;
pub mod error;
pub mod flows;
pub mod gateway;
pub mod service;
pub mod session;
pub mod step;
pub mod validation;

pub use controller::{Clock, ManualClock, StepResult, SystemClock, WizardController};
pub use error::{StorageError, ValidationError, WizardError, WizardResult};
pub use gateway::{PersistenceGateway, PresentationGateway};
pub use service::WizardService;
pub use session::{SessionContext, SessionId, SessionState, SessionSummary, WizardSession};
pub use step::{
    AnswerValue, Answers, ChoiceOption, InputKind, RawInput, ResourceKind, ResourceRef, StepDefinition,
    StepTemplate,
};
