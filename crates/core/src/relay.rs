mod builder;
mod flow;
mod state;

use std::collections::{HashMap, HashSet, VecDeque};

use chat_relay_actor::Actor;
use chat_relay_model::ChatMessage;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub use builder::RelayBuilder;
use flow::{Services, SignalSink};
use state::{DispatchMessage, Job};

use crate::event::{ConversationId, InboundEvent, Reply};
use crate::history::{HistoryStore, SearchSlot};
use crate::settings::RelaySettings;

/// State of the relay actor.
///
/// Events are handled immediately, no matter what the relay is doing. An
/// event for a conversation that is waiting on a provider is queued and
/// handled once that conversation becomes idle, so a conversation sees
/// its events strictly one after another. Other conversations are not
/// held up.
pub(crate) struct RelayState {
    store: HistoryStore,
    settings: RelaySettings,
    services: Services,
    busy: HashSet<ConversationId>,
    pending: HashMap<ConversationId, VecDeque<Job>>,
    running_tasks: HashMap<u64, JoinHandle<()>>,
    /// Conversations of flow tasks that have not reported back yet.
    flows: HashMap<u64, ConversationId>,
    next_task_id: u64,
}

/// Handle to a running relay. Clones share the same relay.
#[derive(Clone)]
pub struct Relay {
    handle: Actor<RelayState>,
}

impl Relay {
    fn spawn_from_builder(builder: RelayBuilder) -> Self {
        let RelayBuilder {
            model_client,
            search_client,
            settings,
            on_signal,
        } = builder;

        let services = Services {
            model_client,
            search_client,
            signals: SignalSink::new(on_signal),
            num_search_results: settings.num_search_results(),
        };
        let state = RelayState {
            store: HistoryStore::new(settings.history_size()),
            settings,
            services,
            busy: Default::default(),
            pending: Default::default(),
            running_tasks: Default::default(),
            flows: Default::default(),
            next_task_id: 1,
        };
        Self {
            handle: Actor::spawn(state, Some("relay")),
        }
    }

    /// Handles an inbound event and returns the reply.
    ///
    /// Returns `None` if the caller is not allowed to use the relay, or if
    /// the relay has been shut down.
    pub async fn handle_event(&self, event: InboundEvent) -> Option<Reply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.handle.send(DispatchMessage { event, reply_tx }).is_err() {
            error!("the relay is no longer running");
            return None;
        }
        reply_rx.await.ok().flatten()
    }

    /// Returns a snapshot of a conversation's history, oldest first.
    pub async fn history(&self, id: ConversationId) -> Vec<ChatMessage> {
        self.handle
            .ask(move |state| state.store.latest(id))
            .await
            .unwrap_or_default()
    }

    /// Returns a snapshot of a conversation's search slot.
    pub async fn search_slot(&self, id: ConversationId) -> Option<SearchSlot> {
        self.handle
            .ask(move |state| state.store.search_slot(id).cloned())
            .await
            .ok()
            .flatten()
    }

    /// Stops the relay. Flows in progress are cancelled and their callers
    /// receive `None`.
    #[inline]
    pub fn shutdown(&self) {
        self.handle.try_kill();
    }
}
