use async_trait::async_trait;

use super::{Command, CommandResult, SessionInfo};
use crate::config::SettingKey;

pub struct SettingsCommand;

#[async_trait]
impl Command for SettingsCommand {
    fn name(&self) -> &str {
        "/settings"
    }

    fn description(&self) -> &str {
        "show the effective lookup settings"
    }

    async fn execute(&self, info: &SessionInfo<'_>) -> CommandResult {
        let width = SettingKey::ALL
            .iter()
            .map(|k| k.as_str().len())
            .max()
            .unwrap_or(0);
        println!("  {:<width$}  {}", "source", info.source);
        for key in SettingKey::ALL {
            println!("  {:<width$}  {}", key.as_str(), info.settings.value_of(key));
        }
        println!("  {:<width$}  {}", "database", info.db_path);
        CommandResult::Handled
    }
}
