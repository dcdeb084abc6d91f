//! Declarative step model.
//!
//! A step never carries a callback: its validation rule is derived from
//! [`InputKind`] and its dynamic follow-up steps from an optional
//! [`StepTemplate`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::error::ValidationError;
use super::validation;

/// Map from step key to validated answer.
pub type Answers = BTreeMap<String, AnswerValue>;

/// One selectable option of a choice step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Stored value.
    pub value: String,
    /// Label shown to the user.
    pub label: String,
}

impl ChoiceOption {
    /// Builds an option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Kind of platform resource a reference step expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Channel,
    Role,
    User,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Channel => write!(f, "channel"),
            ResourceKind::Role => write!(f, "role"),
            ResourceKind::User => write!(f, "user"),
        }
    }
}

/// A resolved reference to a channel, role or user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: i64,
}

/// Input widget a step is answered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// Exactly one option from the set.
    SingleChoice { options: Vec<ChoiceOption> },
    /// Between `min` and `max` distinct options from the set.
    MultiChoice {
        options: Vec<ChoiceOption>,
        min: usize,
        max: usize,
    },
    /// Non-empty text of at most `max_len` characters.
    FreeText { max_len: usize },
    /// A mention or raw id of the given kind.
    ResourceReference { kind: ResourceKind },
}

impl InputKind {
    /// Options offered by choice steps, empty otherwise.
    pub fn options(&self) -> &[ChoiceOption] {
        match self {
            InputKind::SingleChoice { options } | InputKind::MultiChoice { options, .. } => options,
            _ => &[],
        }
    }
}

/// Template used to materialize one step per item chosen in its parent step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTemplate {
    /// Key prefix; generated keys are `"{key}:{item}"`.
    pub key: String,
    /// Prompt, with `{item}` replaced by the chosen option's label.
    pub prompt: String,
    pub input_kind: InputKind,
}

/// Validated value stored in a session's answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    Choice(String),
    Choices(Vec<String>),
    Text(String),
    Reference(ResourceRef),
}

impl AnswerValue {
    /// Chosen option values, used to drive expansion.
    pub fn selected(&self) -> Vec<&str> {
        match self {
            AnswerValue::Choice(value) => vec![value.as_str()],
            AnswerValue::Choices(values) => values.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Choice(value) | AnswerValue::Text(value) => write!(f, "{value}"),
            AnswerValue::Choices(values) => write!(f, "{}", values.join(", ")),
            AnswerValue::Reference(r) => write!(f, "{} {}", r.kind, r.id),
        }
    }
}

/// Raw response delivered by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// Typed message or modal field.
    Text(String),
    /// Values picked from buttons or a select menu.
    Selected(Vec<String>),
}

impl From<&str> for RawInput {
    fn from(text: &str) -> Self {
        RawInput::Text(text.to_string())
    }
}

/// Description of one wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition {
    pub key: String,
    pub prompt: String,
    pub input_kind: InputKind,
    pub depends_on: Vec<String>,
    pub expand: Option<StepTemplate>,
}

/// Result of a successful validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Validated {
    pub value: AnswerValue,
    /// Steps to insert right after the current one.
    pub expanded: Vec<StepDefinition>,
}

impl StepDefinition {
    /// Creates a step with no dependencies and no expansion.
    pub fn new(key: impl Into<String>, prompt: impl Into<String>, input_kind: InputKind) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            input_kind,
            depends_on: Vec::new(),
            expand: None,
        }
    }

    pub fn single_choice(key: &str, prompt: &str, options: Vec<ChoiceOption>) -> Self {
        Self::new(key, prompt, InputKind::SingleChoice { options })
    }

    pub fn multi_choice(key: &str, prompt: &str, options: Vec<ChoiceOption>, min: usize, max: usize) -> Self {
        Self::new(key, prompt, InputKind::MultiChoice { options, min, max })
    }

    pub fn free_text(key: &str, prompt: &str, max_len: usize) -> Self {
        Self::new(key, prompt, InputKind::FreeText { max_len })
    }

    pub fn reference(key: &str, prompt: &str, kind: ResourceKind) -> Self {
        Self::new(key, prompt, InputKind::ResourceReference { kind })
    }

    /// Declares the earlier steps this one derives from.
    pub fn depends_on(mut self, keys: &[&str]) -> Self {
        self.depends_on = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Attaches a per-item expansion template.
    pub fn expand_each(mut self, key: &str, prompt: &str, input_kind: InputKind) -> Self {
        self.expand = Some(StepTemplate {
            key: key.to_string(),
            prompt: prompt.to_string(),
            input_kind,
        });
        self
    }

    /// Validates a raw response and materializes any dynamic steps.
    ///
    /// Pure: the step itself is never modified.
    pub fn validate(&self, raw: &RawInput) -> Result<Validated, ValidationError> {
        let value = validation::validate_input(&self.input_kind, raw)?;
        let expanded = match &self.expand {
            Some(template) => self.materialize(template, &value),
            None => Vec::new(),
        };
        Ok(Validated { value, expanded })
    }

    fn materialize(&self, template: &StepTemplate, value: &AnswerValue) -> Vec<StepDefinition> {
        value
            .selected()
            .into_iter()
            .map(|item| {
                let label = self
                    .input_kind
                    .options()
                    .iter()
                    .find(|o| o.value == item)
                    .map_or(item, |o| o.label.as_str());
                StepDefinition {
                    key: format!("{}:{}", template.key, item),
                    prompt: template.prompt.replace("{item}", label),
                    input_kind: template.input_kind.clone(),
                    depends_on: vec![self.key.clone()],
                    expand: None,
                }
            })
            .collect()
    }
}
