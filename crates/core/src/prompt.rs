//! Assembles single-prompt requests out of search results.

use crate::search::FormattedResults;

/// Tells the model how to use the search results.
pub const SEARCH_INSTRUCTIONS: &str = "Instructions: Using the provided web search results, \
    write a comprehensive reply to the given query. Make sure to cite results using [number] \
    notation after the reference. If the provided search results refer to multiple subjects \
    with the same name, write separate answers for each subject. In the end of answer provide \
    a list of all used URLs.";

/// Builds the prompt for `query`: the results, a blank line, the
/// instructions, a blank line, and the query itself.
pub fn assemble(results: &FormattedResults, query: &str) -> String {
    format!(
        "{}\n\n{}\n\nQuery: {}",
        results.as_str().trim_end(),
        SEARCH_INSTRUCTIONS,
        query
    )
}
