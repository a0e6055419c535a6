use chat_relay_model::SearchHit;

/// How the fake model answers one request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PresetReply {
    /// Answers with the given text.
    Text(String),
    /// Answers with `You said <input>`, where the input is the last user
    /// message (chat) or the whole prompt (completion).
    Echo,
    /// Fails with a rate limit error.
    RateLimited,
    /// Fails with an error of the `Other` kind.
    Failure(String),
    /// Never answers.
    Stall,
}

impl PresetReply {
    /// Creates a `PresetReply::Text`.
    #[inline]
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::Text(text.into())
    }
}

/// How the fake search engine answers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PresetSearch {
    /// Returns these hits, truncated to the requested maximum.
    Hits(Vec<SearchHit>),
    /// Fails with an error of the `Other` kind.
    Failure(String),
}

impl Default for PresetSearch {
    #[inline]
    fn default() -> Self {
        Self::Hits(vec![])
    }
}

/// Shorthand for building a [`SearchHit`].
#[inline]
pub fn hit(body: &str, href: &str) -> SearchHit {
    SearchHit {
        body: body.to_owned(),
        href: href.to_owned(),
    }
}
