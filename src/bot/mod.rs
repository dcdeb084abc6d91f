/// Telegram commands and their argument types
pub mod commands;
/// Update dispatching: commands, free-text answers and button presses
pub mod handlers;
/// Rendering of wizard prompts as Telegram messages
pub mod presenter;
