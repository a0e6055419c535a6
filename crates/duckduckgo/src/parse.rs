use chat_relay_model::SearchHit;

const RESULT_ANCHOR: &str = "class=\"result__a\"";
const RESULT_SNIPPET: &str = "class=\"result__snippet\"";

/// Extracts search hits from a result page, in page order.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    for chunk in html.split(RESULT_ANCHOR).skip(1) {
        if hits.len() >= max_results {
            break;
        }

        let Some(href) = attr_value(chunk, "href") else {
            continue;
        };
        let href = resolve_href(&decode_entities(href));
        // Sponsored results link through the ad tracker.
        if href.is_empty() || href.contains("duckduckgo.com/y.js") {
            continue;
        }

        let title = element_text(chunk).unwrap_or_default();
        let snippet = chunk
            .find(RESULT_SNIPPET)
            .and_then(|idx| element_text(&chunk[idx..]))
            .unwrap_or_default();
        let body = if snippet.is_empty() { title } else { snippet };
        if body.is_empty() {
            continue;
        }

        hits.push(SearchHit { body, href });
    }

    hits
}

/// Returns `true` if the page is the anomaly/captcha page served to
/// clients that send too many requests.
pub fn is_challenge_page(html: &str) -> bool {
    html.contains("anomaly-modal") || html.contains("challenge-form")
}

fn attr_value<'a>(chunk: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let start = chunk.find(&needle)? + needle.len();
    let rest = &chunk[start..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Returns the text between the end of the current tag and the next
/// closing anchor.
fn element_text(chunk: &str) -> Option<String> {
    let start = chunk.find('>')? + 1;
    let rest = &chunk[start..];
    let end = rest.find("</a>")?;
    Some(decode_entities(&strip_tags(&rest[..end])).trim().to_owned())
}

fn resolve_href(href: &str) -> String {
    if let Some(target) = href.split("uddg=").nth(1) {
        let target = target.split('&').next().unwrap_or_default();
        return urlencoding::decode(target)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| target.to_owned());
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{rest}");
    }
    href.to_owned()
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}
