use crate::event::{EventKind, InboundEvent};

/// What the relay should do with an inbound event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Greets the user.
    Start,
    /// Lists the commands.
    Help,
    /// Describes the bot.
    Info,
    /// Reports that the bot is alive.
    Status,
    /// Clears the conversation history.
    Reset,
    /// Discards the last answer and generates a new one.
    Regenerate,
    /// Answers a query with the help of web search results.
    WebSearch(String),
    /// Generates a new answer for the last web search.
    WebSearchRegenerate,
    /// A plain chat message.
    Message(String),
    /// Greets a group chat the bot was just added to.
    Welcome,
}

impl Command {
    /// Maps an event to a command. Unknown commands are plain messages.
    pub fn from_event(event: &InboundEvent) -> Self {
        if event.kind == EventKind::BotJoined {
            return Self::Welcome;
        }
        let Some(name) = event.command_name.as_deref() else {
            return Self::Message(event.text.clone());
        };
        let args = event.command_args.as_deref().unwrap_or_default();
        match name {
            "start" => Self::Start,
            "help" => Self::Help,
            "info" => Self::Info,
            "status" => Self::Status,
            "newtopic" | "reset" => Self::Reset,
            "regen" => Self::Regenerate,
            "web" => Self::WebSearch(args.to_owned()),
            "webregen" => Self::WebSearchRegenerate,
            _ => Self::Message(event.text.clone()),
        }
    }

    /// A short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Info => "info",
            Self::Status => "status",
            Self::Reset => "reset",
            Self::Regenerate => "regenerate",
            Self::WebSearch(_) => "web-search",
            Self::WebSearchRegenerate => "web-search-regenerate",
            Self::Message(_) => "message",
            Self::Welcome => "welcome",
        }
    }
}
