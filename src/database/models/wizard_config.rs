use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::wizard::step::Answers;

/// A finished wizard's answers, stored as JSON per configuration target.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WizardConfig {
    pub scope_key: String,
    pub answers: String,
    pub saved_by: i64,
    pub updated_at: String,
}

impl WizardConfig {
    /// Inserts or replaces the configuration for `scope_key`.
    pub async fn upsert(
        pool: &sqlx::SqlitePool,
        scope_key: &str,
        answers_json: &str,
        saved_by: i64,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO wizard_configs (scope_key, answers, saved_by, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(scope_key) DO UPDATE SET
                answers = excluded.answers,
                saved_by = excluded.saved_by,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(scope_key)
        .bind(answers_json)
        .bind(saved_by)
        .bind(&now)
        .execute(pool)
        .await?;

        Self::find_by_scope(pool, scope_key)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_scope(
        pool: &sqlx::SqlitePool,
        scope_key: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, WizardConfig>(
            "SELECT scope_key, answers, saved_by, updated_at FROM wizard_configs WHERE scope_key = ?",
        )
        .bind(scope_key)
        .fetch_optional(pool)
        .await
    }

    /// Every configuration saved for one target, e.g. all flows of a chat.
    pub async fn find_by_target(
        pool: &sqlx::SqlitePool,
        target: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, WizardConfig>(
            "SELECT scope_key, answers, saved_by, updated_at FROM wizard_configs WHERE scope_key LIKE ? ORDER BY scope_key",
        )
        .bind(format!("%:{target}"))
        .fetch_all(pool)
        .await
    }

    /// Returns whether a row was removed.
    pub async fn delete(pool: &sqlx::SqlitePool, scope_key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM wizard_configs WHERE scope_key = ?")
            .bind(scope_key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Decodes the stored answers.
    pub fn decode_answers(&self) -> Result<Answers, serde_json::Error> {
        serde_json::from_str(&self.answers)
    }
}
