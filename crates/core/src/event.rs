use std::fmt::{self, Display};

/// Identifies one chat. Supplied by the messaging platform and stable for
/// the chat's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(pub i64);

impl Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ConversationId {
    #[inline]
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// What happened in the chat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A text message.
    #[default]
    Message,
    /// The bot was added to a group chat.
    BotJoined,
}

/// A message received from the messaging platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundEvent {
    /// The chat the message was sent in.
    pub conversation_id: ConversationId,
    /// What happened.
    pub kind: EventKind,
    /// The sender.
    pub caller_id: i64,
    /// The full message text.
    pub text: String,
    /// The command name without the leading slash, if the message is a
    /// command.
    pub command_name: Option<String>,
    /// Everything after the command name, trimmed.
    pub command_args: Option<String>,
}

impl InboundEvent {
    /// Creates an event from raw message text, splitting out a leading
    /// `/command[@bot] args` if present.
    pub fn from_text<S: Into<String>>(
        conversation_id: ConversationId,
        caller_id: i64,
        text: S,
    ) -> Self {
        let text = text.into();
        let (command_name, command_args) = match split_command(&text) {
            Some((name, args)) => (Some(name), Some(args)),
            None => (None, None),
        };
        Self {
            conversation_id,
            kind: EventKind::Message,
            caller_id,
            text,
            command_name,
            command_args,
        }
    }

    /// Creates an event for the bot being added to a group chat by
    /// `caller_id`.
    pub fn bot_joined(conversation_id: ConversationId, caller_id: i64) -> Self {
        Self {
            conversation_id,
            kind: EventKind::BotJoined,
            caller_id,
            text: String::new(),
            command_name: None,
            command_args: None,
        }
    }
}

fn split_command(text: &str) -> Option<(String, String)> {
    let rest = text.trim_start().strip_prefix('/')?;
    let (head, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim()),
        None => (rest, ""),
    };
    // Group chats address commands as `/cmd@BotName`.
    let name = head.split('@').next().unwrap_or_default();
    if name.is_empty() {
        return None;
    }
    Some((name.to_ascii_lowercase(), args.to_owned()))
}

/// How the messaging platform should interpret the reply text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseMode {
    /// The text contains `<b>`, `<i>` and escaped entities.
    Html,
}

/// A message to be sent back to the messaging platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// The chat to send the reply to.
    pub conversation_id: ConversationId,
    /// The reply text.
    pub text: String,
    /// How the text should be rendered, `None` for plain text.
    pub parse_mode: Option<ParseMode>,
    /// Whether the reply should quote the triggering message.
    pub quote: bool,
}

impl Reply {
    pub(crate) fn plain(conversation_id: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation_id,
            text: text.into(),
            parse_mode: None,
            quote: false,
        }
    }

    pub(crate) fn quoting(mut self) -> Self {
        self.quote = true;
        self
    }

    pub(crate) fn html(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Html);
        self
    }
}

/// Identifies a placeholder message shown while a slow command runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlaceholderId(pub u64);

/// Side signals for the messaging platform, emitted while a command is
/// being handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Show a "typing" indicator in the chat.
    Typing(ConversationId),
    /// Send a temporary message.
    ShowPlaceholder {
        /// The chat to show the placeholder in.
        conversation_id: ConversationId,
        /// Handle for deleting the placeholder later.
        placeholder: PlaceholderId,
        /// The placeholder text.
        text: String,
    },
    /// Delete a message sent for a previous `ShowPlaceholder`.
    DeletePlaceholder {
        /// The chat the placeholder was shown in.
        conversation_id: ConversationId,
        /// The placeholder to delete.
        placeholder: PlaceholderId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(
            split_command("/web  rust async "),
            Some(("web".to_owned(), "rust async".to_owned()))
        );
        assert_eq!(
            split_command("/Regen@relay_bot"),
            Some(("regen".to_owned(), String::new()))
        );
        assert_eq!(split_command("hello /web"), None);
        assert_eq!(split_command("/ nothing"), None);
        assert_eq!(split_command("/"), None);
    }

    #[test]
    fn test_from_text() {
        let event = InboundEvent::from_text(ConversationId(1), 2, "Hi there");
        assert_eq!(event.command_name, None);
        assert_eq!(event.text, "Hi there");

        let event = InboundEvent::from_text(ConversationId(1), 2, "/web cats");
        assert_eq!(event.command_name.as_deref(), Some("web"));
        assert_eq!(event.command_args.as_deref(), Some("cats"));
        assert_eq!(event.kind, EventKind::Message);

        let event = InboundEvent::bot_joined(ConversationId(-5), 2);
        assert_eq!(event.kind, EventKind::BotJoined);
        assert_eq!(event.command_name, None);
    }
}
