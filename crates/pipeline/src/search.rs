//! In-memory narrowing of a client snapshot.
//!
//! Operates on a snapshot fetched from the store and never touches
//! persistence, so it is safe to call on every keystroke.

use handover_core::filter;
use handover_db::models::client::Client;

/// Filter a snapshot down to the clients matching `query`.
///
/// Case-insensitive substring over first name, last name, and code. A
/// blank query returns the snapshot unchanged; the result is always a
/// subset in the snapshot's order.
pub fn filter_clients(snapshot: &[Client], query: &str) -> Vec<Client> {
    if filter::is_blank(query) {
        return snapshot.to_vec();
    }
    snapshot
        .iter()
        .filter(|client| {
            filter::matches_any(
                query,
                &[&client.first_name, &client.last_name, &client.code],
            )
        })
        .cloned()
        .collect()
}
