//! Built-in setup flows offered by the bot.

use super::step::{ChoiceOption, InputKind, ResourceKind, StepDefinition};

/// Flow names accepted by `/setup`.
pub const FLOW_NAMES: [&str; 4] = ["ticket", "voice", "suggestions", "soutien"];

pub fn names() -> &'static [&'static str] {
    &FLOW_NAMES
}

/// Short description shown in `/flows`.
pub fn describe(flow: &str) -> Option<&'static str> {
    match flow {
        "ticket" => Some("Ticket panel: channel, staff role and one role per category"),
        "voice" => Some("Custom voice channels: hub channel, name template and user limit"),
        "suggestions" => Some("Suggestion box: channel, review role and embed title"),
        "soutien" => Some("Supporter rewards: status keyword and reward role"),
        _ => None,
    }
}

/// Step list for a flow, or `None` for unknown names.
pub fn by_name(flow: &str) -> Option<Vec<StepDefinition>> {
    match flow.trim().to_lowercase().as_str() {
        "ticket" => Some(ticket()),
        "voice" => Some(voice()),
        "suggestions" => Some(suggestions()),
        "soutien" => Some(soutien()),
        _ => None,
    }
}

/// Configuration target key for a flow applied to `target`.
pub fn scope_key(flow: &str, target: i64) -> String {
    format!("{}:{}", flow.trim().to_lowercase(), target)
}

/// Splits a scope key back into flow name and target id.
pub fn parse_scope_key(scope_key: &str) -> Option<(&str, i64)> {
    let (flow, target) = scope_key.rsplit_once(':')?;
    if flow.is_empty() {
        return None;
    }
    target.parse().ok().map(|target| (flow, target))
}

fn ticket() -> Vec<StepDefinition> {
    vec![
        StepDefinition::reference(
            "panel_channel",
            "Which channel should hold the ticket panel?",
            ResourceKind::Channel,
        ),
        StepDefinition::reference("staff_role", "Which role can see every ticket?", ResourceKind::Role),
        StepDefinition::multi_choice(
            "categories",
            "Which ticket categories do you want? (comma separated)",
            vec![
                ChoiceOption::new("support", "Support"),
                ChoiceOption::new("report", "Report"),
                ChoiceOption::new("partnership", "Partnership"),
                ChoiceOption::new("appeal", "Appeal"),
            ],
            1,
            4,
        )
        .expand_each(
            "category_role",
            "Which role handles {item} tickets?",
            InputKind::ResourceReference { kind: ResourceKind::Role },
        ),
    ]
}

fn voice() -> Vec<StepDefinition> {
    vec![
        StepDefinition::reference(
            "hub_channel",
            "Which voice channel creates a new room when joined?",
            ResourceKind::Channel,
        ),
        StepDefinition::free_text(
            "name_template",
            "How should new rooms be named? Use {user} for the owner's name.",
            32,
        ),
        StepDefinition::single_choice(
            "user_limit",
            "How many people can join a room by default?",
            vec![
                ChoiceOption::new("0", "No limit"),
                ChoiceOption::new("2", "2"),
                ChoiceOption::new("5", "5"),
                ChoiceOption::new("10", "10"),
            ],
        ),
    ]
}

fn suggestions() -> Vec<StepDefinition> {
    vec![
        StepDefinition::reference(
            "suggestion_channel",
            "Where should suggestions be posted?",
            ResourceKind::Channel,
        ),
        StepDefinition::reference(
            "review_role",
            "Which role can accept or refuse suggestions?",
            ResourceKind::Role,
        ),
        StepDefinition::free_text("embed_title", "Title shown above each suggestion?", 256),
    ]
}

fn soutien() -> Vec<StepDefinition> {
    vec![
        StepDefinition::free_text(
            "status_keyword",
            "Which text must appear in a member's status to count as support?",
            128,
        ),
        StepDefinition::reference(
            "reward_role",
            "Which role rewards supporters?",
            ResourceKind::Role,
        )
        .depends_on(&["status_keyword"]),
    ]
}
