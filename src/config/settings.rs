use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use super::Config;
use crate::consts::{
    DEFAULT_MAX_MEANINGS, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_SEARCH_URL, DEFAULT_USER_AGENT,
    DEFAULT_WAIT_TIMEOUT, MAX_MEANINGS_LIMIT, WORD_PLACEHOLDER,
};
use crate::source::chrome::ChromeConfig;

/// Keys accepted by the settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    SearchUrl,
    UserAgent,
    WaitTimeoutSecs,
    NavigationTimeoutSecs,
    MaxMeanings,
}

impl SettingKey {
    pub const ALL: [SettingKey; 5] = [
        SettingKey::SearchUrl,
        SettingKey::UserAgent,
        SettingKey::WaitTimeoutSecs,
        SettingKey::NavigationTimeoutSecs,
        SettingKey::MaxMeanings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::SearchUrl => "search_url",
            SettingKey::UserAgent => "user_agent",
            SettingKey::WaitTimeoutSecs => "wait_timeout_secs",
            SettingKey::NavigationTimeoutSecs => "navigation_timeout_secs",
            SettingKey::MaxMeanings => "max_meanings",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim();
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| {
                let known: Vec<&str> = SettingKey::ALL.iter().map(|k| k.as_str()).collect();
                anyhow::anyhow!("unknown setting: {key} (known: {})", known.join(", "))
            })
    }
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub search_url: Option<String>,
    pub user_agent: Option<String>,
    pub wait_timeout_secs: Option<u64>,
    pub max_meanings: Option<usize>,
}

/// Effective settings for a lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub search_url: String,
    pub user_agent: String,
    pub wait_timeout: Duration,
    pub navigation_timeout: Duration,
    pub max_meanings: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            max_meanings: DEFAULT_MAX_MEANINGS,
        }
    }
}

impl Settings {
    /// Resolve settings: overrides, then stored values, then defaults.
    pub fn load(config: &Config, overrides: &Overrides) -> Result<Self> {
        let mut settings = Settings::default();

        for (key, value) in config.entries()? {
            // Unknown keys can only come from hand-edited databases.
            let Ok(key) = key.parse::<SettingKey>() else {
                tracing::warn!("ignoring unknown stored setting: {key}");
                continue;
            };
            settings
                .apply(key, &value)
                .with_context(|| format!("stored setting {key} is invalid"))?;
        }

        if let Some(url) = &overrides.search_url {
            settings
                .apply(SettingKey::SearchUrl, url)
                .context("invalid --search-url")?;
        }
        if let Some(agent) = &overrides.user_agent {
            settings
                .apply(SettingKey::UserAgent, agent)
                .context("invalid --user-agent")?;
        }
        if let Some(secs) = overrides.wait_timeout_secs {
            settings
                .apply(SettingKey::WaitTimeoutSecs, &secs.to_string())
                .context("invalid --timeout")?;
        }
        if let Some(max) = overrides.max_meanings {
            settings
                .apply(SettingKey::MaxMeanings, &max.to_string())
                .context("invalid --max")?;
        }

        Ok(settings)
    }

    /// Check that `key` is known and `value` is acceptable for it.
    pub fn validate_entry(key: &str, value: &str) -> Result<SettingKey> {
        let key: SettingKey = key.parse()?;
        Settings::default().apply(key, value)?;
        Ok(key)
    }

    fn apply(&mut self, key: SettingKey, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            SettingKey::SearchUrl => {
                if !value.contains(WORD_PLACEHOLDER) {
                    bail!("search_url must contain {WORD_PLACEHOLDER}");
                }
                self.search_url = value.to_string();
            }
            SettingKey::UserAgent => {
                if value.is_empty() {
                    bail!("user_agent must not be empty");
                }
                self.user_agent = value.to_string();
            }
            SettingKey::WaitTimeoutSecs => {
                self.wait_timeout = Duration::from_secs(parse_positive(key, value)?);
            }
            SettingKey::NavigationTimeoutSecs => {
                self.navigation_timeout = Duration::from_secs(parse_positive(key, value)?);
            }
            SettingKey::MaxMeanings => {
                let max = parse_positive(key, value)? as usize;
                if max > MAX_MEANINGS_LIMIT {
                    bail!("max_meanings must be at most {MAX_MEANINGS_LIMIT}");
                }
                self.max_meanings = max;
            }
        }
        Ok(())
    }

    /// The current value of `key`, formatted the way it is stored.
    pub fn value_of(&self, key: SettingKey) -> String {
        match key {
            SettingKey::SearchUrl => self.search_url.clone(),
            SettingKey::UserAgent => self.user_agent.clone(),
            SettingKey::WaitTimeoutSecs => self.wait_timeout.as_secs().to_string(),
            SettingKey::NavigationTimeoutSecs => self.navigation_timeout.as_secs().to_string(),
            SettingKey::MaxMeanings => self.max_meanings.to_string(),
        }
    }

    /// Browser configuration for these settings.
    pub fn chrome_config(&self) -> ChromeConfig {
        ChromeConfig {
            search_url: self.search_url.clone(),
            user_agent: self.user_agent.clone(),
            wait_timeout: self.wait_timeout,
            navigation_timeout: self.navigation_timeout,
            ..ChromeConfig::default()
        }
    }
}

fn parse_positive(key: SettingKey, value: &str) -> Result<u64> {
    let n: u64 = value
        .parse()
        .with_context(|| format!("{key} must be a number, got '{value}'"))?;
    if n == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_config() -> Config {
        Config::open(":memory:").unwrap()
    }

    #[test]
    fn defaults_without_storage_or_overrides() {
        let settings = Settings::load(&mem_config(), &Overrides::default()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_meanings, 3);
        assert_eq!(settings.wait_timeout, Duration::from_secs(10));
    }

    #[test]
    fn stored_values_replace_defaults() {
        let config = mem_config();
        config.set("max_meanings", "5").unwrap();
        config.set("user_agent", "engdict-test").unwrap();
        let settings = Settings::load(&config, &Overrides::default()).unwrap();
        assert_eq!(settings.max_meanings, 5);
        assert_eq!(settings.user_agent, "engdict-test");
    }

    #[test]
    fn overrides_win_over_stored_values() {
        let config = mem_config();
        config.set("wait_timeout_secs", "20").unwrap();
        let overrides = Overrides {
            wait_timeout_secs: Some(2),
            ..Overrides::default()
        };
        let settings = Settings::load(&config, &overrides).unwrap();
        assert_eq!(settings.wait_timeout, Duration::from_secs(2));
    }

    #[test]
    fn invalid_override_is_rejected() {
        let overrides = Overrides {
            max_meanings: Some(0),
            ..Overrides::default()
        };
        let err = Settings::load(&mem_config(), &overrides).unwrap_err();
        assert!(format!("{err:#}").contains("--max"));
    }

    #[test]
    fn key_round_trips_through_str() {
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>().unwrap(), key);
        }
    }

    #[test]
    fn unknown_key_lists_known_keys() {
        let err = "colour".parse::<SettingKey>().unwrap_err();
        assert!(err.to_string().contains("max_meanings"));
    }

    #[test]
    fn validate_limits() {
        assert!(Settings::validate_entry("max_meanings", "20").is_ok());
        assert!(Settings::validate_entry("max_meanings", "21").is_err());
        assert!(Settings::validate_entry("navigation_timeout_secs", "-1").is_err());
        assert!(Settings::validate_entry("user_agent", "  ").is_err());
        assert_eq!(
            Settings::validate_entry("search_url", "https://x/?q={word}").unwrap(),
            SettingKey::SearchUrl
        );
    }

    #[test]
    fn value_of_matches_stored_form() {
        let settings = Settings::default();
        assert_eq!(settings.value_of(SettingKey::WaitTimeoutSecs), "10");
        assert_eq!(settings.value_of(SettingKey::NavigationTimeoutSecs), "30");
        assert_eq!(settings.value_of(SettingKey::SearchUrl), DEFAULT_SEARCH_URL);
    }

    #[test]
    fn chrome_config_carries_settings() {
        let settings = Settings {
            wait_timeout: Duration::from_secs(4),
            ..Settings::default()
        };
        let chrome = settings.chrome_config();
        assert_eq!(chrome.wait_timeout, Duration::from_secs(4));
        assert_eq!(chrome.search_url, settings.search_url);
    }
}
