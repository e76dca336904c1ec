//! Scannable-code normalization.
//!
//! Every deliverable carries a printed code whose decoded payload starts
//! with the literal `UNID` prefix followed by the recipient identifier,
//! e.g. `UNID08059`. [`normalize`] turns the raw decoded payload into the
//! canonical [`ClientCode`] used as the unique client key, or `None` when
//! the payload is not a recognizable code.

use serde::{Deserialize, Serialize};

/// Literal prefix every scannable payload must carry.
pub const CODE_PREFIX: &str = "UNID";

/// A normalized scannable code, e.g. `UNID08059`.
///
/// The full trimmed payload (prefix included) is the unique client key;
/// the remainder after the prefix is opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientCode(String);

impl ClientCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ClientCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw decoded payload into a [`ClientCode`].
///
/// Deterministic and total. Trims surrounding whitespace, then rejects
/// blank input, payloads missing the `UNID` prefix, and payloads with
/// nothing after the prefix.
pub fn normalize(raw: &str) -> Option<ClientCode> {
    let trimmed = raw.trim();
    let rest = trimmed.strip_prefix(CODE_PREFIX)?;
    if rest.trim().is_empty() {
        return None;
    }
    Some(ClientCode(trimmed.to_string()))
}
