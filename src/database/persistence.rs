use async_trait::async_trait;

use crate::database::connection::DatabaseManager;
use crate::database::models::WizardConfig;
use crate::wizard::error::StorageError;
use crate::wizard::flows;
use crate::wizard::gateway::PersistenceGateway;
use crate::wizard::step::Answers;

/// Stores finished wizards in the `wizard_configs` table.
#[derive(Clone)]
pub struct SqlitePersistence {
    db: DatabaseManager,
}

impl SqlitePersistence {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    /// Reads back the answers saved for `scope_key`.
    pub async fn load(&self, scope_key: &str) -> Result<Option<Answers>, StorageError> {
        match WizardConfig::find_by_scope(&self.db.pool, scope_key).await? {
            Some(config) => Ok(Some(config.decode_answers()?)),
            None => Ok(None),
        }
    }

    /// Flow names with a saved configuration for `target`.
    pub async fn saved_flows(&self, target: i64) -> Result<Vec<String>, StorageError> {
        let rows = WizardConfig::find_by_target(&self.db.pool, target).await?;
        Ok(rows
            .iter()
            .filter_map(|row| flows::parse_scope_key(&row.scope_key))
            .filter(|(_, row_target)| *row_target == target)
            .map(|(flow, _)| flow.to_string())
            .collect())
    }
}

#[async_trait]
impl PersistenceGateway for SqlitePersistence {
    async fn save(&self, scope_key: &str, answers: &Answers, saved_by: u64) -> Result<(), StorageError> {
        let json = serde_json::to_string(answers)?;
        let saved_by = i64::try_from(saved_by)
            .map_err(|_| StorageError::InvalidRecord(format!("user id {saved_by} does not fit the store")))?;
        WizardConfig::upsert(&self.db.pool, scope_key, &json, saved_by).await?;
        Ok(())
    }
}
