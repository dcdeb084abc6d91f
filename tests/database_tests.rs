use anyhow::Result;
use setup_wizard_bot::database::{connection::DatabaseManager, models::*, persistence::SqlitePersistence};
use setup_wizard_bot::wizard::{AnswerValue, Answers, PersistenceGateway, ResourceKind, ResourceRef, StorageError};
use tempfile::{tempdir, TempDir};

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

fn ticket_answers() -> Answers {
    let mut answers = Answers::new();
    answers.insert(
        "panel_channel".to_string(),
        AnswerValue::Reference(ResourceRef {
            kind: ResourceKind::Channel,
            id: 1001,
        }),
    );
    answers.insert(
        "categories".to_string(),
        AnswerValue::Choices(vec!["support".to_string(), "report".to_string()]),
    );
    answers.insert("note".to_string(), AnswerValue::Text("hello".to_string()));
    answers
}

#[tokio::test]
async fn test_config_upsert_and_find() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let saved = WizardConfig::upsert(&db.pool, "ticket:-100", "{}", 42).await?;
    assert_eq!(saved.scope_key, "ticket:-100");
    assert_eq!(saved.saved_by, 42);

    let found = WizardConfig::find_by_scope(&db.pool, "ticket:-100").await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().answers, "{}");

    Ok(())
}

#[tokio::test]
async fn test_config_not_found() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    let result = WizardConfig::find_by_scope(&db.pool, "voice:1").await?;
    assert!(result.is_none());

    Ok(())
}

#[tokio::test]
async fn test_upsert_replaces_existing_row() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    WizardConfig::upsert(&db.pool, "voice:5", r#"{"a":1}"#, 1).await?;
    WizardConfig::upsert(&db.pool, "voice:5", r#"{"a":2}"#, 2).await?;

    let rows = WizardConfig::find_by_target(&db.pool, 5).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].answers, r#"{"a":2}"#);
    assert_eq!(rows[0].saved_by, 2);

    Ok(())
}

#[tokio::test]
async fn test_find_by_target_only_matches_that_target() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    WizardConfig::upsert(&db.pool, "ticket:-100", "{}", 1).await?;
    WizardConfig::upsert(&db.pool, "voice:-100", "{}", 1).await?;
    WizardConfig::upsert(&db.pool, "voice:-1001", "{}", 1).await?;

    let rows = WizardConfig::find_by_target(&db.pool, -100).await?;
    let keys: Vec<_> = rows.iter().map(|row| row.scope_key.as_str()).collect();
    assert_eq!(keys, vec!["ticket:-100", "voice:-100"]);

    Ok(())
}

#[tokio::test]
async fn test_config_delete() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;

    WizardConfig::upsert(&db.pool, "soutien:7", "{}", 1).await?;
    assert!(WizardConfig::delete(&db.pool, "soutien:7").await?);
    assert!(!WizardConfig::delete(&db.pool, "soutien:7").await?);
    assert!(WizardConfig::find_by_scope(&db.pool, "soutien:7").await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_persistence_save_and_load() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let store = SqlitePersistence::new(db.clone());
    let answers = ticket_answers();

    store.save("ticket:-100", &answers, 42).await?;
    let loaded = store.load("ticket:-100").await?;
    assert_eq!(loaded, Some(answers));

    assert_eq!(store.load("ticket:-200").await?, None);

    Ok(())
}

#[tokio::test]
async fn test_persistence_save_is_idempotent() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let store = SqlitePersistence::new(db.clone());
    let answers = ticket_answers();

    store.save("ticket:-100", &answers, 42).await?;
    store.save("ticket:-100", &answers, 42).await?;

    let rows = WizardConfig::find_by_target(&db.pool, -100).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].decode_answers()?, answers);

    Ok(())
}

#[tokio::test]
async fn test_persistence_rejects_oversized_user_id() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let store = SqlitePersistence::new(db);

    let result = store.save("ticket:1", &ticket_answers(), u64::MAX).await;
    assert!(matches!(result, Err(StorageError::InvalidRecord(_))));

    Ok(())
}

#[tokio::test]
async fn test_corrupt_row_fails_to_decode() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    let store = SqlitePersistence::new(db.clone());

    WizardConfig::upsert(&db.pool, "voice:9", "not json", 1).await?;
    let result = store.load("voice:9").await;
    assert!(matches!(result, Err(StorageError::Encode(_))));

    Ok(())
}

#[tokio::test]
async fn test_database_ping() -> Result<()> {
    let (db, _temp_dir) = setup_test_db().await?;
    db.ping().await?;
    Ok(())
}
