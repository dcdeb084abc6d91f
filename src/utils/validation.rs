use anyhow::{anyhow, Result};

use crate::wizard::flows;

/// Checks a `/setup` or `/show` argument and returns the canonical flow name.
pub fn validate_flow_name(name: &str) -> Result<&'static str> {
    let name = name.trim().to_lowercase();

    if name.is_empty() {
        return Err(anyhow!(
            "Flow name cannot be empty. Available flows: {}",
            flows::names().join(", ")
        ));
    }

    flows::names()
        .iter()
        .find(|flow| **flow == name)
        .copied()
        .ok_or_else(|| anyhow!("Unknown flow '{}'. Available flows: {}", name, flows::names().join(", ")))
}

/// Telegram chat ids are non-zero and bounded.
pub fn validate_telegram_chat_id(chat_id: i64) -> Result<()> {
    if chat_id == 0 {
        return Err(anyhow!("Chat ID cannot be zero"));
    }

    if chat_id > 2147483647 {
        return Err(anyhow!("Invalid user chat ID range"));
    }

    if chat_id < -2000000000000 {
        return Err(anyhow!("Chat ID out of valid range"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_flow_name_valid() {
        assert_eq!(validate_flow_name("ticket").unwrap(), "ticket");
        assert_eq!(validate_flow_name("  Voice ").unwrap(), "voice");
        assert_eq!(validate_flow_name("SOUTIEN").unwrap(), "soutien");
    }

    #[test]
    fn test_validate_flow_name_invalid() {
        assert!(validate_flow_name("").is_err());
        assert!(validate_flow_name("giveaway").is_err());

        let error_msg = validate_flow_name("giveaway").unwrap_err().to_string();
        assert!(error_msg.contains("ticket"));
    }

    #[test]
    fn test_validate_telegram_chat_id() {
        assert!(validate_telegram_chat_id(12345).is_ok());
        assert!(validate_telegram_chat_id(-1001234567890).is_ok());

        assert!(validate_telegram_chat_id(0).is_err());
        assert!(validate_telegram_chat_id(-3000000000000).is_err());
        assert!(validate_telegram_chat_id(3000000000).is_err());
    }
}
