use std::sync::Arc;

use chat_relay_model::{ModelProvider, SearchProvider};

use super::Relay;
use super::flow::SignalFn;
use crate::event::Signal;
use crate::model_client::{ModelClient, ModelOptions};
use crate::search::{SearchClient, SearchOptions};
use crate::settings::{MAX_RAW_SEARCH_RESULTS, MODEL_MAX_TOKENS, RelaySettings};

/// [`Relay`] builder.
pub struct RelayBuilder {
    pub(crate) model_client: ModelClient,
    pub(crate) search_client: SearchClient,
    pub(crate) settings: RelaySettings,
    pub(crate) on_signal: Option<SignalFn>,
}

impl RelayBuilder {
    /// Creates a new builder with the specified providers and default
    /// settings.
    #[inline]
    pub fn with_providers<M, S>(model_provider: M, search_provider: S) -> Self
    where
        M: ModelProvider + 'static,
        S: SearchProvider + 'static,
    {
        Self {
            model_client: ModelClient::new(model_provider),
            search_client: SearchClient::new(search_provider),
            settings: RelaySettings::default(),
            on_signal: None,
        }
    }

    /// Replaces the settings.
    #[inline]
    pub fn with_settings(mut self, settings: RelaySettings) -> Self {
        self.settings = settings;
        self
    }

    /// Attaches a callback receiving typing and placeholder signals.
    ///
    /// The callback is invoked from worker tasks and must not block.
    #[inline]
    pub fn on_signal(
        mut self,
        on_signal: impl Fn(Signal) + Send + Sync + 'static,
    ) -> Self {
        self.on_signal = Some(Arc::new(on_signal));
        self
    }

    /// Builds the relay.
    ///
    /// Must be called within a tokio runtime.
    pub fn build(mut self) -> Relay {
        let settings = &self.settings;
        self.model_client = self.model_client.with_options(ModelOptions {
            sampling: settings.sampling(),
            provider_max_tokens: MODEL_MAX_TOKENS,
            timeout: settings.request_timeout(),
            retry: settings.retry(),
        });
        self.search_client = self.search_client.with_options(SearchOptions {
            max_raw_results: MAX_RAW_SEARCH_RESULTS,
            denylist: settings.video_hostings().to_vec(),
            timeout: settings.request_timeout(),
            retry: settings.retry(),
        });
        Relay::spawn_from_builder(self)
    }
}
