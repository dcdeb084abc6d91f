pub mod setup;
pub mod show;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Setup Wizard Bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "List the available setup flows")]
    Flows,
    #[command(description = "Start a guided setup, e.g. /setup ticket")]
    Setup { flow: String },
    #[command(description = "Cancel your running setup in this chat")]
    Cancel,
    #[command(description = "Retry saving a finished setup")]
    Retry,
    #[command(description = "List your running setups and when they expire")]
    Status,
    #[command(description = "Show the saved configuration of a flow")]
    Show { flow: String },
}
