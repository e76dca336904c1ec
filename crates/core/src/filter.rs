//! Case-insensitive substring matching for interactive list narrowing.
//!
//! Lives in `core` so the predicate is testable without models and cheap
//! enough to run on every keystroke over a few thousand records.

/// `true` when the query carries no usable text.
pub fn is_blank(query: &str) -> bool {
    query.trim().is_empty()
}

/// Case-insensitive substring test of `query` against any of `fields`.
///
/// A blank query matches everything.
pub fn matches_any(query: &str, fields: &[&str]) -> bool {
    if is_blank(query) {
        return true;
    }
    let needle = query.trim().to_lowercase();
    fields
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}
