//! Rendering replies for a plain-text terminal.

use chat_relay_core::{ParseMode, Reply};

/// Returns the reply text as it should be shown on a plain-text
/// terminal. HTML replies lose their tags and entities.
pub fn plain_text(reply: &Reply) -> String {
    match reply.parse_mode {
        Some(ParseMode::Html) => strip_html(&reply.text),
        None => reply.text.clone(),
    }
}

fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        match rest[start..].find('>') {
            Some(end) => rest = &rest[start + end + 1..],
            None => {
                rest = &rest[start..];
                break;
            }
        }
    }
    text.push_str(rest);
    html_escape::decode_html_entities(&text).into_owned()
}

#[cfg(test)]
mod tests {
    use chat_relay_core::{ConversationId, texts};

    use super::*;

    #[test]
    fn test_plain_text() {
        let reply = Reply {
            conversation_id: ConversationId(1),
            text: texts::regenerated_text("a < b?", "Yes & no"),
            parse_mode: Some(ParseMode::Html),
            quote: false,
        };
        assert_eq!(
            plain_text(&reply),
            "Generating new response on your query:\na < b?\n\nYes & no"
        );

        let reply = Reply {
            parse_mode: None,
            text: "<b>as is</b>".to_owned(),
            ..reply
        };
        assert_eq!(plain_text(&reply), "<b>as is</b>");
    }

    #[test]
    fn test_strip_html_unclosed_tag() {
        assert_eq!(strip_html("x <b"), "x <b");
        assert_eq!(strip_html("&amp;lt;"), "&lt;");
        assert_eq!(strip_html("<i>caf&eacute; &#8230;</i>"), "caf\u{e9} \u{2026}");
    }
}
