use anyhow::{anyhow, Result};
use setup_wizard_bot::config::Config;
use setup_wizard_bot::database::connection::DatabaseManager;
use setup_wizard_bot::database::models::WizardConfig;
use std::env;
use std::io;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize basic logging for the migration
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("migrate");

    match command {
        "migrate" | "up" => run_migrations().await,
        "check" => check_database().await,
        "forget" => match args.get(2) {
            Some(scope_key) => forget_configuration(scope_key).await,
            None => {
                eprintln!("Usage: migrate forget <scope_key>");
                std::process::exit(1);
            }
        },
        "reset" => reset_database().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {command}");
            print_help();
            std::process::exit(1);
        }
    }
}

/// The migration tool only needs the database, not a bot token.
fn database_url() -> String {
    dotenvy::dotenv().ok();
    Config::from_env()
        .map(|config| config.database_url)
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| "sqlite:./data/wizard.db".to_string())
}

async fn run_migrations() -> Result<()> {
    println!("🔧 Setup Wizard Bot - Database Migration Tool");
    println!("==============================================");

    let database_url = database_url();
    println!("📊 Database URL: {}", mask_url(&database_url));

    // Ensure data directory exists for SQLite
    if let Some(db_path) = database_url.strip_prefix("sqlite:") {
        if let Some(parent) = Path::new(db_path.trim_start_matches("//")).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                println!("📁 Creating directory: {}", parent.display());
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    println!("🚀 Running database migrations...");

    let db_manager = DatabaseManager::new(&database_url)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    match db_manager.run_migrations().await {
        Ok(_) => println!("✅ Migrations completed successfully!"),
        Err(e) => {
            eprintln!("❌ Migration failed: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn check_database() -> Result<()> {
    println!("🔍 Checking database connection and schema...");

    let database_url = database_url();
    println!("📊 Database URL: {}", mask_url(&database_url));

    let db_manager = DatabaseManager::new(&database_url)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    match check_tables(&db_manager).await {
        Ok(tables) => {
            println!("✅ Database connection successful!");
            println!("📋 Found tables:");
            for table in tables {
                println!("  • {table}");
            }
        }
        Err(e) => {
            println!("⚠️  Database check failed: {e}");
            println!("💡 Try running 'migrate up' to create the schema");
        }
    }

    Ok(())
}

async fn forget_configuration(scope_key: &str) -> Result<()> {
    let db_manager = DatabaseManager::new(&database_url())
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    if WizardConfig::delete(&db_manager.pool, scope_key).await? {
        println!("🗑️  Removed saved configuration {scope_key}");
    } else {
        println!("ℹ️  No saved configuration for {scope_key}");
    }
    Ok(())
}

async fn reset_database() -> Result<()> {
    println!("⚠️  WARNING: This will delete ALL saved configurations!");
    println!("🤔 Are you sure you want to continue? (yes/no)");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    if input.trim().to_lowercase() != "yes" {
        println!("❌ Reset cancelled.");
        return Ok(());
    }

    let database_url = database_url();

    // For SQLite, we can just delete the file
    match database_url.strip_prefix("sqlite:") {
        Some(db_path) => {
            let db_path = db_path.trim_start_matches("//");
            if Path::new(db_path).exists() {
                std::fs::remove_file(db_path)?;
                println!("🗑️  Deleted database file: {db_path}");
            }
        }
        None => return Err(anyhow!("Reset is only supported for SQLite databases")),
    }

    println!("🔄 Recreating database schema...");
    run_migrations().await?;

    println!("✅ Database reset completed!");
    Ok(())
}

async fn check_tables(db_manager: &DatabaseManager) -> Result<Vec<String>> {
    let tables = sqlx::query_scalar::<_, String>("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .fetch_all(&db_manager.pool)
        .await?;
    Ok(tables)
}

fn mask_url(url: &str) -> String {
    match url.strip_prefix("sqlite:") {
        Some(path) => match Path::new(path).file_name() {
            Some(filename) => format!("sqlite:.../{}", filename.to_string_lossy()),
            None => url.to_string(),
        },
        None => url.to_string(),
    }
}

fn print_help() {
    println!("🧭 Setup Wizard Bot - Database Migration Tool");
    println!();
    println!("USAGE:");
    println!("    migrate [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    migrate, up          Run database migrations (default)");
    println!("    check                Check database connection and schema");
    println!("    forget <scope_key>   Delete one saved configuration, e.g. ticket:-100123");
    println!("    reset                Reset database (SQLite only) - DESTRUCTIVE!");
    println!("    help                 Show this help message");
    println!();
    println!("ENVIRONMENT:");
    println!("    DATABASE_URL   Database connection string (default: sqlite:./data/wizard.db)");
    println!();
}
