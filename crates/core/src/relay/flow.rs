use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chat_relay_model::ChatMessage;

use crate::error::{CompletionError, SearchError};
use crate::event::{ConversationId, PlaceholderId, Signal};
use crate::model_client::ModelClient;
use crate::prompt;
use crate::search::SearchClient;
use crate::texts::{GENERATING_TEXT, SEARCHING_TEXT};

pub(crate) type SignalFn = Arc<dyn Fn(Signal) + Send + Sync>;

/// Delivers side signals to the messaging platform.
#[derive(Clone)]
pub(crate) struct SignalSink {
    on_signal: Option<SignalFn>,
    next_placeholder: Arc<AtomicU64>,
}

impl SignalSink {
    #[inline]
    pub fn new(on_signal: Option<SignalFn>) -> Self {
        Self {
            on_signal,
            next_placeholder: Arc::new(AtomicU64::new(1)),
        }
    }

    #[inline]
    fn emit(&self, signal: Signal) {
        if let Some(on_signal) = &self.on_signal {
            on_signal(signal);
        }
    }

    pub fn typing(&self, conversation_id: ConversationId) {
        self.emit(Signal::Typing(conversation_id));
    }

    pub fn show_placeholder(
        &self,
        conversation_id: ConversationId,
        text: &str,
    ) -> PlaceholderId {
        let placeholder =
            PlaceholderId(self.next_placeholder.fetch_add(1, Ordering::Relaxed));
        self.emit(Signal::ShowPlaceholder {
            conversation_id,
            placeholder,
            text: text.to_owned(),
        });
        placeholder
    }

    pub fn delete_placeholder(
        &self,
        conversation_id: ConversationId,
        placeholder: PlaceholderId,
    ) {
        self.emit(Signal::DeletePlaceholder {
            conversation_id,
            placeholder,
        });
    }
}

/// Everything a flow needs outside the actor.
#[derive(Clone)]
pub(crate) struct Services {
    pub model_client: ModelClient,
    pub search_client: SearchClient,
    pub signals: SignalSink,
    pub num_search_results: usize,
}

/// The part of a flow that waits for providers. It runs in a spawned
/// task and never touches the history.
#[derive(Debug)]
pub(crate) enum PendingCall {
    Chat {
        messages: Vec<ChatMessage>,
    },
    Regenerate {
        messages: Vec<ChatMessage>,
        query: String,
    },
    Search {
        query: String,
    },
    SearchRegenerate {
        prompt: String,
    },
}

/// What a finished [`PendingCall`] reports back to the actor.
#[derive(Debug)]
pub(crate) enum Outcome {
    Chatted(Result<String, CompletionError>),
    Regenerated {
        query: String,
        answer: Result<String, CompletionError>,
    },
    Searched {
        prompt: String,
        answer: Result<String, CompletionError>,
    },
    SearchFailed(SearchError),
    SearchRegenerated(Result<String, CompletionError>),
}

impl PendingCall {
    pub async fn run(self, id: ConversationId, services: Services) -> Outcome {
        let Services {
            model_client,
            search_client,
            signals,
            num_search_results,
        } = services;

        match self {
            Self::Chat { messages } => {
                signals.typing(id);
                Outcome::Chatted(model_client.chat(messages).await)
            }
            Self::Regenerate { messages, query } => {
                signals.typing(id);
                let placeholder = signals.show_placeholder(id, GENERATING_TEXT);
                let answer = model_client.chat(messages).await;
                signals.delete_placeholder(id, placeholder);
                Outcome::Regenerated { query, answer }
            }
            Self::Search { query } => {
                let placeholder = signals.show_placeholder(id, SEARCHING_TEXT);
                signals.typing(id);
                let results =
                    search_client.search(&query, num_search_results).await;
                let outcome = match results {
                    Ok(results) => {
                        let prompt = prompt::assemble(&results, &query);
                        signals.typing(id);
                        let answer = model_client.complete(&prompt).await;
                        Outcome::Searched { prompt, answer }
                    }
                    Err(err) => Outcome::SearchFailed(err),
                };
                signals.delete_placeholder(id, placeholder);
                outcome
            }
            Self::SearchRegenerate { prompt } => {
                signals.typing(id);
                let placeholder = signals.show_placeholder(id, GENERATING_TEXT);
                let answer = model_client.complete(&prompt).await;
                signals.delete_placeholder(id, placeholder);
                Outcome::SearchRegenerated(answer)
            }
        }
    }
}
