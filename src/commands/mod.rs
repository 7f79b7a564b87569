//! REPL commands prefixed with `/`.
//!
//! Commands implement the [`Command`] trait and are registered in a
//! [`CommandRegistry`], which handles dispatch, aliases, and help text.
//! Any other input line is a word to look up.

mod help;
mod open;
mod quit;
mod settings;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::Settings;

/// Session state visible to commands.
pub struct SessionInfo<'a> {
    pub source: &'a str,
    pub settings: &'a Settings,
    pub db_path: &'a str,
    /// Most recent word looked up in this session, if any.
    pub last_word: Option<&'a str>,
}

/// What the REPL should do after a command runs.
#[derive(Debug)]
pub enum CommandResult {
    /// Not a command; look the input up.
    NotACommand,
    /// Command handled, continue the REPL loop.
    Handled,
    /// Exit the REPL.
    Quit,
}

/// A REPL command.
#[async_trait]
pub trait Command: Send + Sync {
    /// Primary name, e.g. `"/open"`.
    fn name(&self) -> &str;

    /// Alternative names, e.g. `&["/h", "/?"]`.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// One-line description for `/help`.
    fn description(&self) -> &str;

    async fn execute(&self, info: &SessionInfo<'_>) -> CommandResult;
}

pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
}

impl CommandRegistry {
    /// Create a registry with all built-in commands.
    pub fn new() -> Self {
        let commands: Vec<Arc<dyn Command>> = vec![
            Arc::new(help::HelpCommand),
            Arc::new(settings::SettingsCommand),
            Arc::new(open::OpenCommand),
            Arc::new(quit::QuitCommand),
        ];
        Self { commands }
    }

    pub fn register(&mut self, command: Arc<dyn Command>) {
        self.commands.push(command);
    }

    /// Dispatch input to a matching command, or return `NotACommand`.
    pub async fn dispatch(&self, input: &str, info: &SessionInfo<'_>) -> CommandResult {
        let cmd = input.trim();

        for command in &self.commands {
            if cmd == command.name() || command.aliases().contains(&cmd) {
                // /help lists the registry itself
                if command.name() == "/help" {
                    print!("{}", self.help_text());
                    return CommandResult::Handled;
                }
                return command.execute(info).await;
            }
        }

        if cmd.starts_with('/') {
            println!("unknown command: {cmd}");
            println!("type /help for available commands");
            return CommandResult::Handled;
        }

        CommandResult::NotACommand
    }

    /// Help text for every registered command.
    pub fn help_text(&self) -> String {
        let entries: Vec<(String, &str)> = self
            .commands
            .iter()
            .map(|c| (format_label(c.name(), c.aliases()), c.description()))
            .collect();

        let max_width = entries
            .iter()
            .map(|(label, _)| label.len())
            .max()
            .unwrap_or(10);

        let mut out = String::from("  type any word to look it up\n\n");
        for (label, desc) in &entries {
            out.push_str(&format!("  {label:<max_width$}  {desc}\n"));
        }
        out
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name()).collect()
    }

    /// All registered names and aliases.
    pub fn all_triggers(&self) -> Vec<&str> {
        let mut triggers = Vec::new();
        for cmd in &self.commands {
            triggers.push(cmd.name());
            triggers.extend_from_slice(cmd.aliases());
        }
        triggers
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn format_label(name: &str, aliases: &[&str]) -> String {
    if aliases.is_empty() {
        name.to_string()
    } else {
        format!("{} ({})", name, aliases.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    static DEFAULT_SETTINGS: Lazy<Settings> = Lazy::new(Settings::default);

    pub(crate) fn test_info() -> SessionInfo<'static> {
        SessionInfo {
            source: "mock",
            settings: &DEFAULT_SETTINGS,
            db_path: ":memory:",
            last_word: None,
        }
    }

    #[test]
    fn all_builtins_registered() {
        let reg = CommandRegistry::new();
        let names = reg.names();
        assert!(names.contains(&"/help"));
        assert!(names.contains(&"/settings"));
        assert!(names.contains(&"/open"));
        assert!(names.contains(&"/quit"));
    }

    #[test]
    fn no_duplicate_triggers() {
        let reg = CommandRegistry::new();
        let triggers = reg.all_triggers();
        let mut seen = Vec::new();
        for t in &triggers {
            assert!(!seen.contains(t), "duplicate trigger: {t}");
            seen.push(t);
        }
    }

    #[test]
    fn help_text_includes_all_commands_and_aliases() {
        let reg = CommandRegistry::new();
        let text = reg.help_text();
        for name in reg.names() {
            assert!(text.contains(name), "help missing: {name}");
        }
        assert!(text.contains("/h"));
        assert!(text.contains("/?"));
    }

    #[tokio::test]
    async fn help_is_handled() {
        let reg = CommandRegistry::new();
        assert!(matches!(
            reg.dispatch("/?", &test_info()).await,
            CommandResult::Handled
        ));
    }

    #[tokio::test]
    async fn unknown_slash_command_is_handled() {
        let reg = CommandRegistry::new();
        assert!(matches!(
            reg.dispatch("/foobar", &test_info()).await,
            CommandResult::Handled
        ));
    }

    #[tokio::test]
    async fn words_pass_through() {
        let reg = CommandRegistry::new();
        assert!(matches!(
            reg.dispatch("serendipity", &test_info()).await,
            CommandResult::NotACommand
        ));
        assert!(matches!(
            reg.dispatch("  apple  ", &test_info()).await,
            CommandResult::NotACommand
        ));
    }

    #[tokio::test]
    async fn registered_command_is_dispatched() {
        struct PingCommand;

        #[async_trait]
        impl Command for PingCommand {
            fn name(&self) -> &str {
                "/ping"
            }
            fn description(&self) -> &str {
                "pong"
            }
            async fn execute(&self, _info: &SessionInfo<'_>) -> CommandResult {
                CommandResult::Quit
            }
        }

        let mut reg = CommandRegistry::new();
        reg.register(Arc::new(PingCommand));
        assert!(matches!(
            reg.dispatch("/ping", &test_info()).await,
            CommandResult::Quit
        ));
        assert!(reg.help_text().contains("/ping"));
    }

    #[test]
    fn format_label_with_aliases() {
        assert_eq!(format_label("/open", &[]), "/open");
        assert_eq!(format_label("/help", &["/h", "/?"]), "/help (/h, /?)");
    }
}
