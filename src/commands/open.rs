use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::source::search_url;

/// Opens the last word's search page in the system browser.
pub struct OpenCommand;

#[async_trait]
impl Command for OpenCommand {
    fn name(&self) -> &str {
        "/open"
    }

    fn description(&self) -> &str {
        "open the last word in your browser"
    }

    async fn execute(&self, info: &SessionInfo<'_>) -> CommandResult {
        let Some(word) = info.last_word else {
            eprintln!("  ✗ nothing looked up yet");
            return CommandResult::Handled;
        };

        let url = search_url(&info.settings.search_url, word);
        match open::that(&url) {
            Ok(()) => println!("  opened {url}"),
            Err(e) => {
                eprintln!("  ✗ failed to open browser: {e}");
                println!("  {url}");
            }
        }
        CommandResult::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::test_info;

    #[tokio::test]
    async fn without_last_word_is_handled() {
        // test_info has no last word, so no browser is launched.
        assert!(matches!(
            OpenCommand.execute(&test_info()).await,
            CommandResult::Handled
        ));
    }

    #[test]
    fn metadata() {
        assert_eq!(OpenCommand.name(), "/open");
        assert!(!OpenCommand.description().is_empty());
    }
}
