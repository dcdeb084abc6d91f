use tracing::{debug, error, info, warn};

use crate::wizard::session::SessionId;

/// Logs command start with consistent format
pub fn log_command_start(command: &str, user: &str, user_id: u64, chat_id: i64, details: Option<&str>) {
    match details {
        Some(d) => info!(
            "CMD_START: {} by {}({}) in chat {} - {}",
            command, user, user_id, chat_id, d
        ),
        None => info!("CMD_START: {} by {}({}) in chat {}", command, user, user_id, chat_id),
    }
}

/// Logs command errors with consistent format
pub fn log_command_error(command: &str, user: &str, user_id: u64, chat_id: i64, error: &str) {
    error!(
        "CMD_ERROR: {} by {}({}) in chat {} - {}",
        command, user, user_id, chat_id, error
    );
}

/// Logs a wizard session being opened
pub fn log_wizard_start(session_id: &SessionId, scope_key: &str, initiator: u64, steps: usize) {
    info!(
        "WIZARD_START: {} for {} by user {} ({} steps)",
        session_id, scope_key, initiator, steps
    );
}

/// Logs a wizard advancing to its next step
pub fn log_wizard_step(session_id: &SessionId, position: usize, total: usize) {
    debug!("WIZARD_STEP: {} now at step {}/{}", session_id, position + 1, total);
}

/// Logs a wizard leaving the live set
pub fn log_wizard_end(session_id: &SessionId, scope_key: &str, outcome: &str) {
    info!("WIZARD_END: {} for {} - {}", session_id, scope_key, outcome);
}

/// Logs validation errors with consistent format
pub fn log_validation_error(scope_key: &str, step_key: &str, code: &str, user_id: u64) {
    warn!(
        "VALIDATION_ERROR: {} step '{}' rejected input: {} - user {}",
        scope_key, step_key, code, user_id
    );
}

/// Logs database operations with consistent format
pub fn log_database_operation(operation: &str, table: &str, details: Option<&str>) {
    match details {
        Some(d) => debug!("DB_OP: {} on {} - {}", operation, table, d),
        None => debug!("DB_OP: {} on {}", operation, table),
    }
}

/// Logs database errors with consistent format
pub fn log_database_error(operation: &str, table: &str, error: &str, details: Option<&str>) {
    match details {
        Some(d) => error!("DB_ERROR: {} on {} failed: {} - {}", operation, table, error, d),
        None => error!("DB_ERROR: {} on {} failed: {}", operation, table, error),
    }
}

/// Logs system events with consistent format
pub fn log_system_event(event: &str, details: Option<&str>) {
    match details {
        Some(d) => info!("SYSTEM: {} - {}", event, d),
        None => info!("SYSTEM: {}", event),
    }
}
