//! Startup configuration read from the environment.
//!
//! Parsing is written against a lookup function rather than `std::env`
//! directly, so `main` can layer CLI flags on top and tests can feed a map.

pub mod store;

use std::time::Duration;

use thiserror::Error;

use crate::bridge::polling::PollConfig;
use crate::consts::DEFAULT_POLL_INTERVAL;

pub const BASE_URL_VAR: &str = "A2A_BASE_URL";
pub const POLL_INTERVAL_VAR: &str = "A2A_POLL_INTERVAL";
pub const MAX_WAIT_VAR: &str = "A2A_MAX_WAIT";
pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingEnvVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Where the agent lives and how to poll it.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub base_url: String,
    pub poll: PollConfig,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_non_empty)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(BASE_URL_VAR)
            .ok_or_else(|| ConfigError::MissingEnvVar(BASE_URL_VAR.to_string()))?;

        let interval = lookup(POLL_INTERVAL_VAR)
            .map(|v| parse_seconds(POLL_INTERVAL_VAR, &v))
            .transpose()?
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let max_wait = lookup(MAX_WAIT_VAR)
            .map(|v| parse_seconds(MAX_WAIT_VAR, &v))
            .transpose()?;

        Ok(Self {
            base_url,
            poll: PollConfig { interval, max_wait },
        })
    }
}

/// Telegram credentials plus the one chat allowed to talk to the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub token: String,
    pub chat_id: i64,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_non_empty)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let token = lookup(BOT_TOKEN_VAR)
            .ok_or_else(|| ConfigError::MissingEnvVar(BOT_TOKEN_VAR.to_string()))?;

        let chat_id = lookup(CHAT_ID_VAR)
            .ok_or_else(|| ConfigError::MissingEnvVar(CHAT_ID_VAR.to_string()))?
            .trim()
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidValue(CHAT_ID_VAR.to_string(), e.to_string()))?;

        Ok(Self { token, chat_id })
    }
}

/// Read an environment variable, treating empty as unset.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a non-negative number of seconds, fractions allowed.
pub fn parse_seconds(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| {
            ConfigError::InvalidValue(key.to_string(), e.to_string())
        })?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("{value} is not a non-negative number of seconds"),
        ));
    }
    Ok(Duration::from_secs_f64(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn bridge_config_reads_all_values() {
        let config = BridgeConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "http://agent"),
            (POLL_INTERVAL_VAR, "0.1"),
            (MAX_WAIT_VAR, "90"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://agent");
        assert_eq!(config.poll.interval, Duration::from_millis(100));
        assert_eq!(config.poll.max_wait, Some(Duration::from_secs(90)));
    }

    #[test]
    fn bridge_config_defaults() {
        let config = BridgeConfig::from_lookup(lookup(&[(BASE_URL_VAR, "http://agent")])).unwrap();
        assert_eq!(config.poll.interval, DEFAULT_POLL_INTERVAL);
        assert!(config.poll.max_wait.is_none());
    }

    #[test]
    fn bridge_config_requires_base_url() {
        let err = BridgeConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar(BASE_URL_VAR.to_string()));
        assert_eq!(err.to_string(), "A2A_BASE_URL is required");
    }

    #[test]
    fn bridge_config_rejects_bad_interval() {
        let err = BridgeConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "http://agent"),
            (POLL_INTERVAL_VAR, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key, _) if key == POLL_INTERVAL_VAR));
    }

    #[test]
    fn bot_config_reads_environment() {
        let config = BotConfig::from_lookup(lookup(&[
            (BOT_TOKEN_VAR, "token"),
            (CHAT_ID_VAR, "456"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            BotConfig {
                token: "token".to_string(),
                chat_id: 456,
            }
        );
    }

    #[test]
    fn bot_config_accepts_negative_group_ids() {
        let config = BotConfig::from_lookup(lookup(&[
            (BOT_TOKEN_VAR, "token"),
            (CHAT_ID_VAR, "-100123"),
        ]))
        .unwrap();
        assert_eq!(config.chat_id, -100123);
    }

    #[test]
    fn bot_config_requires_token_then_chat() {
        let err = BotConfig::from_lookup(lookup(&[(CHAT_ID_VAR, "1")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar(BOT_TOKEN_VAR.to_string()));

        let err = BotConfig::from_lookup(lookup(&[(BOT_TOKEN_VAR, "t")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar(CHAT_ID_VAR.to_string()));
    }

    #[test]
    fn bot_config_rejects_non_numeric_chat() {
        let err = BotConfig::from_lookup(lookup(&[
            (BOT_TOKEN_VAR, "t"),
            (CHAT_ID_VAR, "me"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key, _) if key == CHAT_ID_VAR));
    }

    #[test]
    fn parse_seconds_rejects_negative_and_nan() {
        assert!(parse_seconds("X", "-1").is_err());
        assert!(parse_seconds("X", "NaN").is_err());
        assert!(parse_seconds("X", "inf").is_err());
        assert_eq!(parse_seconds("X", "0").unwrap(), Duration::ZERO);
        assert_eq!(parse_seconds("X", " 2.5 ").unwrap(), Duration::from_millis(2500));
    }
}
