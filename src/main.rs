//! # Setup Wizard Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, starts the
//! session sweep and health server, and runs the Telegram bot.

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use setup_wizard_bot::bot::handlers::BotHandler;
use setup_wizard_bot::bot::presenter::TelegramPresenter;
use setup_wizard_bot::config::Config;
use setup_wizard_bot::database::connection::DatabaseManager;
use setup_wizard_bot::database::persistence::SqlitePersistence;
use setup_wizard_bot::services::health::HealthService;
use setup_wizard_bot::services::sweep::SweepService;
use setup_wizard_bot::utils::logging::log_system_event;
use setup_wizard_bot::wizard::{WizardController, WizardService};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "setup_wizard_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Setup Wizard Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}, wizard ttl: {}s",
        config.database_url, config.http_port, config.wizard_ttl_secs
    );

    // Initialize database
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    log_system_event("database ready", None);

    // Wire the wizard core to its gateways
    let bot = Bot::new(&config.telegram_bot_token);
    let store = SqlitePersistence::new(db_arc.as_ref().clone());
    let controller = Arc::new(WizardController::new());
    let wizards = Arc::new(WizardService::new(
        controller.clone(),
        Arc::new(store.clone()),
        Arc::new(TelegramPresenter::new(bot.clone())),
        config.wizard_ttl(),
    ));
    let handler = BotHandler::new(wizards.clone(), store);

    // Sweep abandoned sessions in the background
    let mut sweep_service = match SweepService::new(wizards.clone(), &config.sweep_schedule).await {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to create sweep service: {}", e);
            return Err(anyhow::anyhow!("Failed to create sweep service: {}", e));
        }
    };

    if let Err(e) = sweep_service.start().await {
        tracing::error!("Failed to start sweep service: {}", e);
    }

    let health_service = HealthService::new(db_arc.clone(), controller);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;

    info!("Health check server starting on port {}", config.http_port);

    // Run both the bot and health server concurrently
    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let health_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, health_service.router).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    // Wait for either task to complete (which would indicate shutdown)
    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = health_task => {
            if let Err(e) = result {
                tracing::error!("Health task error: {}", e);
            }
        }
    }

    if let Err(e) = sweep_service.stop().await {
        tracing::warn!("Error stopping sweep service: {}", e);
    }

    log_system_event("application stopped", None);
    Ok(())
}
