//! An out-of-the-box chat relay that wires the OpenAI-compatible model
//! provider and the DuckDuckGo search provider into a relay.
//!
//! The crate includes a console front end for using in the terminal. The
//! library part can be used to put the relay behind any messaging
//! platform.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod config;
pub mod render;

use chat_relay_core::{Allowlist, RelayBuilder, RelaySettings, RetryPolicy};
use chat_relay_duckduckgo::DuckDuckGoProvider;
use chat_relay_openai_model::{OpenAIConfigBuilder, OpenAIProvider};

pub use config::{Config, ConfigError};

/// Re-exports of [`chat_relay_core`] crate.
pub mod core {
    pub use chat_relay_core::*;
}

/// Creates a relay builder with real providers and the settings from
/// `config`. Signal callbacks can still be attached before building.
pub fn relay_builder(config: &Config) -> RelayBuilder {
    let mut openai_config = OpenAIConfigBuilder::with_api_key(&config.api_key)
        .with_model(&config.chat_model)
        .with_timeout(config.request_timeout);
    if let Some(base_url) = &config.base_url {
        openai_config = openai_config.with_base_url(base_url);
    }
    if let Some(completion_model) = &config.completion_model {
        openai_config = openai_config.with_completion_model(completion_model);
    }
    let openai_config = openai_config.build();
    debug!("using {openai_config:?}");

    let model_provider = OpenAIProvider::new(openai_config);
    let search_provider = DuckDuckGoProvider::new(config.request_timeout);

    RelayBuilder::with_providers(model_provider, search_provider)
        .with_settings(settings_from(config))
}

fn settings_from(config: &Config) -> RelaySettings {
    RelaySettings::default()
        .with_chat_model(&config.chat_model)
        .with_max_tokens(config.max_tokens)
        .with_history_size(config.history_size)
        .with_num_search_results(config.num_search_results)
        .with_allowlist(config.allowed_ids.iter().copied().collect::<Allowlist>())
        .with_request_timeout(config.request_timeout)
        .with_retry(RetryPolicy {
            max_retries: config.max_retries,
            ..Default::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = Config::from_lookup(|name| match name {
            "OPENAI_API_KEY" => Some("sk".to_owned()),
            "GPT_CHAT_MODEL" => Some("gpt-4o-mini".to_owned()),
            "ALLOWED_CHAT_IDS" => Some("1,2".to_owned()),
            "MAX_RETRIES" => Some("0".to_owned()),
            _ => None,
        })
        .unwrap();
        let settings = settings_from(&config);
        assert_eq!(settings.chat_model(), "gpt-4o-mini");
        assert_eq!(settings.version(), env!("CARGO_PKG_VERSION"));
        assert!(settings.allowlist().permits(2, 99));
        assert!(!settings.allowlist().permits(3, 99));
        assert_eq!(settings.retry().max_retries, 0);
    }
}
