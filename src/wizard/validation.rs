//! Validation policy applied to raw responses, one rule per input kind.

use std::collections::HashSet;

use super::error::ValidationError;
use super::step::{AnswerValue, ChoiceOption, InputKind, RawInput, ResourceKind, ResourceRef};

/// Validates `raw` against the rule implied by `kind`.
pub fn validate_input(kind: &InputKind, raw: &RawInput) -> Result<AnswerValue, ValidationError> {
    match kind {
        InputKind::SingleChoice { options } => {
            let value = single_value(raw)?;
            resolve_option(options, &value).map(AnswerValue::Choice)
        }
        InputKind::MultiChoice { options, min, max } => {
            validate_selection(options, raw, *min, *max).map(AnswerValue::Choices)
        }
        InputKind::FreeText { max_len } => {
            let text = single_value(raw)?;
            validate_text(&text, *max_len).map(AnswerValue::Text)
        }
        InputKind::ResourceReference { kind } => {
            let text = single_value(raw)?;
            parse_reference(*kind, &text).map(AnswerValue::Reference)
        }
    }
}

/// Checks free text: trimmed, non-empty and at most `max_len` characters.
pub fn validate_text(text: &str, max_len: usize) -> Result<String, ValidationError> {
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    if text.chars().count() > max_len {
        return Err(ValidationError::ExceedsLength { max: max_len });
    }

    Ok(text.to_string())
}

/// Parses a mention (`<#id>`, `<@&id>`, `<@id>`, `<@!id>`) or a bare id.
pub fn parse_reference(expected: ResourceKind, input: &str) -> Result<ResourceRef, ValidationError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let (kind, digits) = if let Some(inner) = input.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        if let Some(rest) = inner.strip_prefix("@&") {
            (ResourceKind::Role, rest)
        } else if let Some(rest) = inner.strip_prefix("@!") {
            (ResourceKind::User, rest)
        } else if let Some(rest) = inner.strip_prefix('@') {
            (ResourceKind::User, rest)
        } else if let Some(rest) = inner.strip_prefix('#') {
            (ResourceKind::Channel, rest)
        } else {
            return Err(ValidationError::MalformedReference(input.to_string()));
        }
    } else {
        (expected, input)
    };

    if kind != expected {
        return Err(ValidationError::MalformedReference(format!(
            "expected a {expected}, got a {kind}"
        )));
    }

    match digits.parse::<i64>() {
        Ok(0) | Err(_) => Err(ValidationError::MalformedReference(input.to_string())),
        Ok(id) => Ok(ResourceRef { kind, id }),
    }
}

fn single_value(raw: &RawInput) -> Result<String, ValidationError> {
    match raw {
        RawInput::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                Err(ValidationError::EmptyInput)
            } else {
                Ok(text.to_string())
            }
        }
        RawInput::Selected(values) => {
            let values: Vec<&str> = values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()).collect();
            match values.as_slice() {
                [] => Err(ValidationError::EmptyInput),
                [value] => Ok(value.to_string()),
                _ => Err(ValidationError::OutOfRange(
                    "exactly one value must be chosen".to_string(),
                )),
            }
        }
    }
}

/// Matches a value or (case-insensitively) a label against the option set.
fn resolve_option(options: &[ChoiceOption], input: &str) -> Result<String, ValidationError> {
    options
        .iter()
        .find(|o| o.value == input || o.label.eq_ignore_ascii_case(input))
        .map(|o| o.value.clone())
        .ok_or_else(|| ValidationError::OutOfRange(format!("'{input}' is not one of the options")))
}

fn validate_selection(
    options: &[ChoiceOption],
    raw: &RawInput,
    min: usize,
    max: usize,
) -> Result<Vec<String>, ValidationError> {
    let items: Vec<String> = match raw {
        RawInput::Text(text) => text
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        RawInput::Selected(values) => values
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    };

    if items.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let mut seen = HashSet::new();
    let mut selected = Vec::with_capacity(items.len());
    for item in &items {
        let value = resolve_option(options, item)?;
        if !seen.insert(value.clone()) {
            return Err(ValidationError::DuplicateSelection(value));
        }
        selected.push(value);
    }

    if selected.len() < min || selected.len() > max {
        return Err(ValidationError::OutOfRange(format!(
            "choose between {min} and {max} options"
        )));
    }

    Ok(selected)
}
