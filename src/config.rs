use anyhow::{anyhow, Result};
use chrono::Duration;
use std::env;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/wizard.db";
const DEFAULT_SWEEP_SCHEDULE: &str = "0 */5 * * * *";

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub database_url: String,
    pub http_port: u16,
    /// Idle time after which an unanswered wizard is discarded.
    pub wizard_ttl_secs: u64,
    /// Cron expression for the expired-session sweep.
    pub sweep_schedule: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = non_empty_var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let http_port = non_empty_var("HTTP_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let wizard_ttl_secs: u64 = non_empty_var("WIZARD_TTL_SECS")
            .unwrap_or_else(|| "900".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid WIZARD_TTL_SECS"))?;

        if wizard_ttl_secs == 0 || wizard_ttl_secs > 86_400 {
            return Err(anyhow!("WIZARD_TTL_SECS must be between 1 and 86400"));
        }

        let sweep_schedule =
            non_empty_var("SWEEP_SCHEDULE").unwrap_or_else(|| DEFAULT_SWEEP_SCHEDULE.to_string());

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            wizard_ttl_secs,
            sweep_schedule,
        })
    }

    pub fn wizard_ttl(&self) -> Duration {
        Duration::seconds(self.wizard_ttl_secs as i64)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
