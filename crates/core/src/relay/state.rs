use std::collections::hash_map::Entry;

use chat_relay_actor::{Actor, Message};
use chat_relay_model::{ChatMessage, Role};
use tokio::sync::oneshot;

use super::RelayState;
use super::flow::{Outcome, PendingCall};
use crate::command::Command;
use crate::error::CompletionError;
use crate::event::{ConversationId, InboundEvent, Reply};
use crate::texts;

type ReplySender = oneshot::Sender<Option<Reply>>;

/// A command waiting for its conversation to become idle.
#[derive(Debug)]
pub(super) struct Job {
    command: Command,
    reply_tx: ReplySender,
}

/// How a command proceeds after its synchronous part.
enum Step {
    /// Nothing to wait for.
    Done(Reply),
    /// A provider call has to be made first.
    Call(PendingCall),
}

impl RelayState {
    fn dispatch(
        &mut self,
        event: InboundEvent,
        reply_tx: ReplySender,
        handle: &Actor<Self>,
    ) {
        let id = event.conversation_id;
        if !self.settings.allowlist().permits(id.0, event.caller_id) {
            // Unknown callers get no answer at all.
            debug!("dropping an event from {} in {id}", event.caller_id);
            reply_tx.send(None).ok();
            return;
        }

        let command = Command::from_event(&event);
        debug!("conversation {id}: {}", command.name());
        trace!("event text: {:?}", event.text);

        let job = Job { command, reply_tx };
        if self.busy.contains(&id) {
            // Handled when the running flow of this conversation finishes.
            self.pending.entry(id).or_default().push_back(job);
            return;
        }
        self.start_job(id, job, handle);
    }

    fn start_job(&mut self, id: ConversationId, job: Job, handle: &Actor<Self>) {
        let Job { command, reply_tx } = job;
        let call = match self.begin(id, command) {
            Step::Done(reply) => {
                reply_tx.send(Some(reply)).ok();
                return;
            }
            Step::Call(call) => call,
        };

        self.busy.insert(id);
        let services = self.services.clone();
        let handle_clone = handle.clone();
        let task_id = self.spawn_task(
            move |task_id| async move {
                let outcome = call.run(id, services).await;
                handle_clone
                    .send(FlowFinishedMessage {
                        task_id,
                        id,
                        outcome,
                        reply_tx,
                    })
                    .ok();
            },
            handle,
        );
        self.flows.insert(task_id, id);
    }

    /// Runs the synchronous part of a command: access to the history and
    /// everything that needs no provider.
    fn begin(&mut self, id: ConversationId, command: Command) -> Step {
        let reply = match command {
            Command::Start => Reply::plain(id, texts::start_text(self.settings.chat_model())),
            Command::Help => Reply::plain(id, texts::HELP_TEXT),
            Command::Welcome => {
                Reply::plain(id, texts::welcome_text(self.settings.chat_model()))
            }
            Command::Info => Reply::plain(
                id,
                texts::info_text(self.settings.chat_model(), self.settings.version()),
            ),
            Command::Status => Reply::plain(id, texts::STATUS_TEXT),
            Command::Reset => {
                self.store.reset(id);
                Reply::plain(id, texts::RESET_TEXT)
            }
            Command::Message(text) => {
                self.store.append(id, ChatMessage::user(text));
                return Step::Call(PendingCall::Chat {
                    messages: self.store.latest(id),
                });
            }
            Command::Regenerate => {
                if self.store.last(id).is_some_and(|msg| msg.role == Role::Assistant) {
                    self.store.pop_last(id);
                }
                match self.store.last(id) {
                    Some(last) => {
                        let query = last.content.clone();
                        return Step::Call(PendingCall::Regenerate {
                            messages: self.store.latest(id),
                            query,
                        });
                    }
                    None => Reply::plain(id, texts::NOTHING_TO_REGENERATE_TEXT),
                }
            }
            Command::WebSearch(query) => {
                if query.trim().is_empty() {
                    Reply::plain(id, texts::WEB_USAGE_TEXT)
                } else {
                    return Step::Call(PendingCall::Search { query });
                }
            }
            Command::WebSearchRegenerate => match self.store.search_prompt(id) {
                Some(prompt) => {
                    return Step::Call(PendingCall::SearchRegenerate {
                        prompt: prompt.to_owned(),
                    });
                }
                None => Reply::plain(id, texts::NO_PRIOR_SEARCH_TEXT),
            },
        };
        Step::Done(reply)
    }

    /// Applies the result of a provider call to the history and builds
    /// the reply.
    fn finish(&mut self, id: ConversationId, outcome: Outcome) -> Reply {
        match outcome {
            Outcome::Chatted(answer) => {
                let text = self.record_answer(id, answer);
                Reply::plain(id, text).quoting()
            }
            Outcome::Regenerated { query, answer } => match answer {
                Ok(answer) => {
                    let text = texts::regenerated_text(&query, &answer);
                    self.store.append(id, ChatMessage::assistant(answer));
                    Reply::plain(id, text).html()
                }
                Err(err) => Reply::plain(id, err.to_string()),
            },
            Outcome::Searched { prompt, answer } => {
                self.store.set_search_prompt(id, prompt);
                let text = match answer {
                    Ok(answer) => {
                        self.store.set_search_text(id, answer.clone());
                        answer
                    }
                    Err(err) => err.to_string(),
                };
                Reply::plain(id, text).quoting()
            }
            Outcome::SearchFailed(err) => {
                warn!("web search in {id} failed: {err:?}");
                Reply::plain(id, err.to_string()).quoting()
            }
            Outcome::SearchRegenerated(answer) => {
                let text = match answer {
                    Ok(answer) => {
                        self.store.set_search_text(id, answer.clone());
                        answer
                    }
                    Err(err) => err.to_string(),
                };
                Reply::plain(id, text)
            }
        }
    }

    /// Appends a successful answer to the history. Failed calls leave the
    /// history as is.
    fn record_answer(
        &mut self,
        id: ConversationId,
        answer: Result<String, CompletionError>,
    ) -> String {
        match answer {
            Ok(answer) => {
                self.store.append(id, ChatMessage::assistant(answer.clone()));
                answer
            }
            Err(err) => err.to_string(),
        }
    }

    fn process_next_job(&mut self, id: ConversationId, handle: &Actor<Self>) {
        while !self.busy.contains(&id) {
            let Entry::Occupied(mut queue) = self.pending.entry(id) else {
                return;
            };
            let job = queue.get_mut().pop_front();
            if queue.get().is_empty() {
                queue.remove();
            }
            match job {
                Some(job) => self.start_job(id, job, handle),
                None => return,
            }
        }
    }

    fn spawn_task<F, Fut>(&mut self, f: F, handle: &Actor<Self>) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task_id = self.next_task_id;
        self.next_task_id += 1;

        let guard = TaskEndGuard {
            task_id,
            handle: handle.clone(),
        };
        let fut = f(task_id);
        let task = tokio::spawn(async move {
            // Dropped on completion, on panic and on abort alike.
            let _guard = guard;
            fut.await;
        });
        self.running_tasks.insert(task_id, task);
        task_id
    }

    /// Frees a conversation whose flow task ended without reporting back.
    /// Its caller gets no reply; queued events run as usual.
    fn abandon_flow(&mut self, task_id: u64, handle: &Actor<Self>) {
        let Some(id) = self.flows.remove(&task_id) else {
            return;
        };
        error!("flow task {task_id} of conversation {id} ended abnormally");
        self.busy.remove(&id);
        self.process_next_job(id, handle);
    }
}

/// Reports the end of a spawned task to the relay.
struct TaskEndGuard {
    task_id: u64,
    handle: Actor<RelayState>,
}

impl Drop for TaskEndGuard {
    fn drop(&mut self) {
        self.handle.send(TaskEndedMessage(self.task_id)).ok();
    }
}

impl Drop for RelayState {
    fn drop(&mut self) {
        for task in self.running_tasks.values() {
            task.abort();
        }
    }
}

#[derive(Debug)]
pub(super) struct DispatchMessage {
    pub event: InboundEvent,
    pub reply_tx: ReplySender,
}

impl Message<RelayState> for DispatchMessage {
    #[inline]
    fn handle(self, state: &mut RelayState, handle: &Actor<RelayState>) {
        state.dispatch(self.event, self.reply_tx, handle);
    }
}

#[derive(Debug)]
struct FlowFinishedMessage {
    task_id: u64,
    id: ConversationId,
    outcome: Outcome,
    reply_tx: ReplySender,
}

impl Message<RelayState> for FlowFinishedMessage {
    fn handle(self, state: &mut RelayState, handle: &Actor<RelayState>) {
        state.flows.remove(&self.task_id);
        let reply = state.finish(self.id, self.outcome);
        // The caller may have stopped waiting.
        self.reply_tx.send(Some(reply)).ok();

        state.busy.remove(&self.id);
        state.process_next_job(self.id, handle);
    }
}

#[derive(Debug)]
struct TaskEndedMessage(u64);

impl Message<RelayState> for TaskEndedMessage {
    fn handle(self, state: &mut RelayState, handle: &Actor<RelayState>) {
        if state.running_tasks.remove(&self.0).is_none() {
            error!("task {} ended twice", self.0);
        }
        state.abandon_flow(self.0, handle);
    }
}
