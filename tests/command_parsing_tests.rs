use setup_wizard_bot::bot::commands::Command;
use teloxide::utils::command::BotCommands;

#[cfg(test)]
mod command_parsing_tests {
    use super::*;

    #[test]
    fn test_help_command_parsing() {
        let result = Command::parse("/help", "testbot");
        assert_eq!(result.unwrap(), Command::Help);
    }

    #[test]
    fn test_start_command_parsing() {
        let result = Command::parse("/start", "testbot");
        assert_eq!(result.unwrap(), Command::Start);
    }

    #[test]
    fn test_flows_command_parsing() {
        let result = Command::parse("/flows", "testbot");
        assert_eq!(result.unwrap(), Command::Flows);
    }

    #[test]
    fn test_setup_command_with_flow() {
        let result = Command::parse("/setup ticket", "testbot");
        assert_eq!(
            result.unwrap(),
            Command::Setup {
                flow: "ticket".to_string()
            }
        );
    }

    #[test]
    fn test_setup_command_requires_flow() {
        let result = Command::parse("/setup", "testbot");
        assert!(result.is_err());
    }

    #[test]
    fn test_cancel_and_retry_commands() {
        assert_eq!(Command::parse("/cancel", "testbot").unwrap(), Command::Cancel);
        assert_eq!(Command::parse("/retry", "testbot").unwrap(), Command::Retry);
        assert_eq!(Command::parse("/status", "testbot").unwrap(), Command::Status);
    }

    #[test]
    fn test_show_command_with_flow() {
        let result = Command::parse("/show voice", "testbot");
        assert_eq!(
            result.unwrap(),
            Command::Show {
                flow: "voice".to_string()
            }
        );
    }

    #[test]
    fn test_command_with_bot_name() {
        let result = Command::parse("/cancel@testbot", "testbot");
        assert_eq!(result.unwrap(), Command::Cancel);
    }

    #[test]
    fn test_unknown_command() {
        assert!(Command::parse("/unknown", "testbot").is_err());
    }

    #[test]
    fn test_non_command_text() {
        assert!(Command::parse("just some text", "testbot").is_err());
    }

    #[test]
    fn test_descriptions_list_every_command() {
        let help = Command::descriptions().to_string();
        for name in ["/help", "/start", "/flows", "/setup", "/cancel", "/retry", "/status", "/show"] {
            assert!(help.contains(name), "missing {name} in help");
        }
    }
}
