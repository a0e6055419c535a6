//! Per-conversation chat history and search slots.

use std::collections::{HashMap, VecDeque};

use chat_relay_model::ChatMessage;

use crate::event::ConversationId;

/// The last web-search prompt of a conversation and the answer generated
/// for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchSlot {
    prompt: String,
    text: Option<String>,
}

impl SearchSlot {
    /// The assembled prompt sent to the model.
    #[inline]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The last answer generated for the prompt, if any.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Owns the bounded chat history and the search slot of every
/// conversation.
///
/// Histories are created on first append and never expire. Once a history
/// holds `capacity` messages, every append evicts exactly the oldest one.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    capacity: usize,
    chats: HashMap<ConversationId, VecDeque<ChatMessage>>,
    searches: HashMap<ConversationId, SearchSlot>,
}

impl HistoryStore {
    /// Creates an empty store whose histories hold at most `capacity`
    /// messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            chats: HashMap::new(),
            searches: HashMap::new(),
        }
    }

    /// Returns the history bound.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a message, evicting the oldest one if the bound is
    /// exceeded.
    pub fn append(&mut self, id: ConversationId, message: ChatMessage) {
        let history = self.chats.entry(id).or_default();
        history.push_back(message);
        if history.len() > self.capacity {
            history.pop_front();
        }
    }

    /// Removes the most recent message. Returns `false` (and does nothing)
    /// if the history is empty.
    pub fn pop_last(&mut self, id: ConversationId) -> bool {
        self.chats
            .get_mut(&id)
            .and_then(VecDeque::pop_back)
            .is_some()
    }

    /// Empties the history of a conversation.
    pub fn reset(&mut self, id: ConversationId) {
        self.chats.insert(id, VecDeque::new());
    }

    /// Returns a copy of the history, oldest first.
    pub fn latest(&self, id: ConversationId) -> Vec<ChatMessage> {
        self.chats
            .get(&id)
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the most recent message.
    #[inline]
    pub fn last(&self, id: ConversationId) -> Option<&ChatMessage> {
        self.chats.get(&id)?.back()
    }

    /// Returns the number of stored messages.
    #[inline]
    pub fn len(&self, id: ConversationId) -> usize {
        self.chats.get(&id).map_or(0, VecDeque::len)
    }

    /// Returns `true` if the conversation has no stored messages.
    #[inline]
    pub fn is_empty(&self, id: ConversationId) -> bool {
        self.len(id) == 0
    }

    /// Replaces the search slot with a fresh prompt and no answer.
    pub fn set_search_prompt(&mut self, id: ConversationId, prompt: String) {
        self.searches.insert(id, SearchSlot { prompt, text: None });
    }

    /// Records the answer for the current search prompt. Returns `false`
    /// (and does nothing) if no search has been performed yet.
    pub fn set_search_text(&mut self, id: ConversationId, text: String) -> bool {
        match self.searches.get_mut(&id) {
            Some(slot) => {
                slot.text = Some(text);
                true
            }
            None => false,
        }
    }

    /// Returns the current search prompt, `None` if no search has been
    /// performed yet.
    #[inline]
    pub fn search_prompt(&self, id: ConversationId) -> Option<&str> {
        self.searches.get(&id).map(SearchSlot::prompt)
    }

    /// Returns the whole search slot.
    #[inline]
    pub fn search_slot(&self, id: ConversationId) -> Option<&SearchSlot> {
        self.searches.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: ConversationId = ConversationId(1);

    fn numbered(n: usize) -> ChatMessage {
        if n % 2 == 0 {
            ChatMessage::user(format!("#{n}"))
        } else {
            ChatMessage::assistant(format!("#{n}"))
        }
    }

    #[test]
    fn test_window_keeps_last_messages() {
        for capacity in [1, 3, 20] {
            for appends in [0, 1, capacity - 1, capacity, capacity + 1, 3 * capacity] {
                let mut store = HistoryStore::new(capacity);
                let all: Vec<_> = (0..appends).map(numbered).collect();
                for msg in &all {
                    store.append(ID, msg.clone());
                }

                let kept = appends.min(capacity);
                assert_eq!(store.len(ID), kept);
                assert_eq!(store.latest(ID), all[appends - kept..].to_vec());
            }
        }
    }

    #[test]
    fn test_pop_then_append_replaces_last() {
        let mut store = HistoryStore::new(5);
        for n in 0..4 {
            store.append(ID, numbered(n));
        }
        let mut expected = store.latest(ID);

        assert!(store.pop_last(ID));
        store.append(ID, ChatMessage::assistant("replacement"));

        *expected.last_mut().unwrap() = ChatMessage::assistant("replacement");
        assert_eq!(store.latest(ID), expected);
    }

    #[test]
    fn test_pop_on_empty_history() {
        let mut store = HistoryStore::new(5);
        assert!(!store.pop_last(ID));
        store.reset(ID);
        assert!(!store.pop_last(ID));
        assert!(store.is_empty(ID));
    }

    #[test]
    fn test_reset() {
        let mut store = HistoryStore::new(3);
        for n in 0..7 {
            store.append(ID, numbered(n));
        }
        store.reset(ID);
        assert!(store.latest(ID).is_empty());

        store.append(ID, ChatMessage::user("fresh"));
        assert_eq!(store.latest(ID), vec![ChatMessage::user("fresh")]);
    }

    #[test]
    fn test_conversations_are_isolated() {
        let mut store = HistoryStore::new(3);
        let other = ConversationId(2);
        store.append(ID, ChatMessage::user("one"));
        store.append(other, ChatMessage::user("two"));
        store.reset(other);

        assert_eq!(store.latest(ID), vec![ChatMessage::user("one")]);
        assert!(store.latest(other).is_empty());
        assert_eq!(store.last(ID), Some(&ChatMessage::user("one")));
    }

    #[test]
    fn test_search_slot() {
        let mut store = HistoryStore::new(3);
        assert_eq!(store.search_prompt(ID), None);
        assert!(!store.set_search_text(ID, "orphan".to_owned()));
        assert_eq!(store.search_slot(ID), None);

        store.set_search_prompt(ID, String::new());
        assert_eq!(store.search_prompt(ID), Some(""));

        store.set_search_prompt(ID, "prompt 1".to_owned());
        assert!(store.set_search_text(ID, "answer 1".to_owned()));
        assert_eq!(store.search_slot(ID).unwrap().text(), Some("answer 1"));

        // A new search overwrites the whole slot.
        store.set_search_prompt(ID, "prompt 2".to_owned());
        let slot = store.search_slot(ID).unwrap();
        assert_eq!(slot.prompt(), "prompt 2");
        assert_eq!(slot.text(), None);

        // Chat history is independent of the slot.
        assert!(store.is_empty(ID));
    }
}
