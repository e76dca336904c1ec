//! Delivery state-machine vocabulary and the delivered/timestamp
//! reconciliation rule shared by the resolver and the manual edit path.

use serde::Serialize;

use crate::types::Timestamp;

/// Why a scan did not result in a delivery.
///
/// None of these are errors: the resolver reports the reason and re-arms
/// for the next event. `AlreadyDelivered` in particular is an idempotence
/// guard, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    /// The payload is not a recognizable client code.
    InvalidCode,
    /// The code is well-formed but no client carries it.
    ClientNotFound,
    /// The client is already marked delivered; re-scans never mutate state.
    AlreadyDelivered,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCode => "invalid_code",
            Self::ClientNotFound => "client_not_found",
            Self::AlreadyDelivered => "already_delivered",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconcile a delivered flag with its timestamp.
///
/// Invariant: a persisted row has a timestamp iff it is delivered. A
/// delivered client keeps its recorded timestamp (or is stamped `now`
/// when the edit path set the flag without one); an undelivered client
/// carries no timestamp.
pub fn reconcile_delivered_at(
    delivered: bool,
    current: Option<Timestamp>,
    now: Timestamp,
) -> Option<Timestamp> {
    if delivered {
        Some(current.unwrap_or(now))
    } else {
        None
    }
}
