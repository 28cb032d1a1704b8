//! In-process equivalent of PostgreSQL `simple` text search matching.
//!
//! `to_tsvector('simple', doc) @@ plainto_tsquery('simple', query)` lowercases
//! both sides, splits them into word tokens and requires every query token to
//! be present in the document. Backends without native text search use these
//! functions so search semantics survive a storage swap.

/// Lowercased word tokens of `text`, split on non-alphanumeric characters.
pub fn simple_tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Whether `query` matches `document` under simple-mode rules.
///
/// An empty query matches everything. A non-empty query that yields no
/// tokens (for example `"!!"`) matches nothing.
pub fn simple_match(document: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    let wanted = simple_tokens(query);
    if wanted.is_empty() {
        return false;
    }

    let present = simple_tokens(document);
    wanted.iter().all(|token| present.contains(token))
}
