//! Fixed texts sent by the relay.

/// Reply to `/start`.
pub fn start_text(chat_model: &str) -> String {
    format!(
        "Hello! I'm a ChatGPT bot.\nI am using {chat_model}.\nSend me a message or a command, and I'll respond!"
    )
}

/// Reply to `/help`.
pub const HELP_TEXT: &str = "Here's a list of available commands:\n\
    /start - Start the bot\n\
    /help - Show this help message\n\
    /info - Get information about the bot\n\
    /status - Check the bot's status\n\
    /newtopic - Clear ChatGPT conversation history\n\
    /regen - Regenerate last GPT response\n\
    /web <query> - Search with Duckduckgo and process results with ChatGPT using query\n\
    /webregen - Regenerate the answer to the last web search\n";

/// Greeting sent when the bot is added to a group chat.
pub fn welcome_text(chat_model: &str) -> String {
    format!("{}\n\n{HELP_TEXT}", start_text(chat_model))
}

/// Reply to `/info`.
pub fn info_text(chat_model: &str, version: &str) -> String {
    format!(
        "I'm a ChatGPT bot.\nI am using {chat_model}.\nI can respond to your messages and a few basic commands.\nVersion: {version}"
    )
}

/// Reply to `/status`.
pub const STATUS_TEXT: &str = "I'm currently up and running!";

/// Reply to `/newtopic`.
pub const RESET_TEXT: &str = "ChatGPT conversation history is cleared!";

/// Reply to `/webregen` before any `/web`.
pub const NO_PRIOR_SEARCH_TEXT: &str =
    "There is no web search to regenerate. Perform a search with /web <query> first.";

/// Reply to `/regen` on an empty history.
pub const NOTHING_TO_REGENERATE_TEXT: &str =
    "There is nothing to regenerate yet. Send me a message first.";

/// Reply to `/web` without a query.
pub const WEB_USAGE_TEXT: &str = "Usage: /web <query>";

/// Placeholder shown while searching.
pub const SEARCHING_TEXT: &str = "Searching…";

/// Placeholder shown while regenerating.
pub const GENERATING_TEXT: &str = "Generating new answer…";

/// Escapes text for HTML replies.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// HTML reply to `/regen`, echoing the query the answer was generated for.
pub fn regenerated_text(query: &str, answer: &str) -> String {
    format!(
        "Generating new response on your query:\n<i><b>{}</b></i>\n\n{}",
        escape_html(query),
        escape_html(answer)
    )
}
