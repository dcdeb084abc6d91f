//! # Setup Wizard Bot
//!
//! A Telegram bot that walks community admins through guided, multi-step
//! configuration flows (ticket panels, custom voice rooms, suggestion boxes,
//! supporter rewards) and stores the result.
//!
//! ## Features
//! - One wizard per user and configuration target, answered step by step
//! - Buttons for single choices, replies for text, lists and mentions
//! - Follow-up steps generated from earlier answers
//! - Idle wizards expire; finished ones are persisted to SQLite

/// Bot commands, update handlers and prompt rendering
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database connection, models and the persistence gateway
pub mod database;
/// Background services: session sweep and health checks
pub mod services;
/// Utility functions for logging, validation and formatting
pub mod utils;
/// The wizard state machine and its gateways
pub mod wizard;
