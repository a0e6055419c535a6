use std::env;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use std::time::Duration;

use chat_relay_core::{MAX_HISTORY_SIZE, MAX_SEARCH_RESULTS, MODEL_MAX_TOKENS};
use thiserror::Error;

/// Error returned when the environment holds an unusable configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
    /// A variable could not be parsed.
    #[error("invalid value {value:?} for {name}: {reason}")]
    Invalid {
        /// The variable name.
        name: &'static str,
        /// The raw value.
        value: String,
        /// Why parsing failed.
        reason: String,
    },
}

/// Relay configuration read from the environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// `OPENAI_API_KEY`.
    pub api_key: String,
    /// `OPENAI_BASE_URL`, the provider's default if unset.
    pub base_url: Option<String>,
    /// `GPT_CHAT_MODEL`.
    pub chat_model: String,
    /// `GPT_COMPLETION_MODEL`, the provider's default if unset.
    pub completion_model: Option<String>,
    /// `MAX_TOKENS`, capped at the provider limit.
    pub max_tokens: u32,
    /// `CHAT_HISTORY_SIZE`, capped.
    pub history_size: usize,
    /// `NUM_SEARCH_RESULTS`, capped.
    pub num_search_results: usize,
    /// `ALLOWED_CHAT_IDS`, comma separated. Empty means public.
    pub allowed_ids: Vec<i64>,
    /// `REQUEST_TIMEOUT_SECS`.
    pub request_timeout: Duration,
    /// `MAX_RETRIES`.
    pub max_retries: u32,
    /// `CONSOLE_CHAT_ID`, the conversation id used by the console.
    pub console_chat_id: i64,
}

impl Config {
    /// Reads the configuration from the environment, after loading an
    /// optional `.env` file from the current directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                warn!("failed to load .env: {err}");
            }
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY")
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))?;
        let allowed_ids = match get("ALLOWED_CHAT_IDS") {
            Some(raw) => parse_ids(&raw)?,
            None => vec![],
        };

        Ok(Self {
            api_key,
            base_url: get("OPENAI_BASE_URL"),
            chat_model: get("GPT_CHAT_MODEL")
                .unwrap_or_else(|| "gpt-3.5-turbo".to_owned()),
            completion_model: get("GPT_COMPLETION_MODEL"),
            max_tokens: parse_or(&get, "MAX_TOKENS", 500u32)?
                .min(MODEL_MAX_TOKENS),
            history_size: parse_or(&get, "CHAT_HISTORY_SIZE", 20usize)?
                .clamp(1, MAX_HISTORY_SIZE),
            num_search_results: parse_or(&get, "NUM_SEARCH_RESULTS", 3usize)?
                .min(MAX_SEARCH_RESULTS),
            allowed_ids,
            request_timeout: Duration::from_secs(parse_or(
                &get,
                "REQUEST_TIMEOUT_SECS",
                60u64,
            )?),
            max_retries: parse_or(&get, "MAX_RETRIES", 2u32)?,
            console_chat_id: parse_or(&get, "CONSOLE_CHAT_ID", 0i64)?,
        })
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<deducted>")
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("completion_model", &self.completion_model)
            .field("max_tokens", &self.max_tokens)
            .field("history_size", &self.history_size)
            .field("num_search_results", &self.num_search_results)
            .field("allowed_ids", &self.allowed_ids)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("console_chat_id", &self.console_chat_id)
            .finish()
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        name,
        value: raw.to_owned(),
        reason: err.to_string(),
    })
}

fn parse_ids(raw: &str) -> Result<Vec<i64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| parse_value("ALLOWED_CHAT_IDS", id))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("OPENAI_API_KEY", "sk-secret")]).unwrap();
        assert_eq!(config.chat_model, "gpt-3.5-turbo");
        assert_eq!(config.base_url, None);
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.history_size, 20);
        assert_eq!(config.num_search_results, 3);
        assert!(config.allowed_ids.is_empty());
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.console_chat_id, 0);
        assert!(!format!("{config:?}").contains("sk-secret"));
    }

    #[test]
    fn test_missing_api_key() {
        assert_eq!(
            config(&[("GPT_CHAT_MODEL", "gpt-4")]).unwrap_err(),
            ConfigError::Missing("OPENAI_API_KEY")
        );
        assert_eq!(
            config(&[("OPENAI_API_KEY", "  ")]).unwrap_err(),
            ConfigError::Missing("OPENAI_API_KEY")
        );
    }

    #[test]
    fn test_caps() {
        let config = config(&[
            ("OPENAI_API_KEY", "sk"),
            ("MAX_TOKENS", "10000"),
            ("CHAT_HISTORY_SIZE", "100"),
            ("NUM_SEARCH_RESULTS", "25"),
        ])
        .unwrap();
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.history_size, 50);
        assert_eq!(config.num_search_results, 10);
    }

    #[test]
    fn test_allowed_ids() {
        let config = config(&[
            ("OPENAI_API_KEY", "sk"),
            ("ALLOWED_CHAT_IDS", "42, -100200,,7"),
        ])
        .unwrap();
        assert_eq!(config.allowed_ids, vec![42, -100200, 7]);
    }

    #[test]
    fn test_invalid_values() {
        let err = config(&[("OPENAI_API_KEY", "sk"), ("MAX_TOKENS", "lots")])
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { name: "MAX_TOKENS", ref value, .. } if value == "lots"
        ));

        let err = config(&[("OPENAI_API_KEY", "sk"), ("ALLOWED_CHAT_IDS", "42,me")])
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid value \"me\" for ALLOWED_CHAT_IDS"));
    }
}
