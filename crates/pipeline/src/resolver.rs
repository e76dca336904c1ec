//! Scan-resolution state machine: one decoded payload in, one outcome
//! out.
//!
//! A resolution walks decoding → resolving → confirming; unrecognizable
//! payloads, unknown clients, and already-delivered clients short-circuit
//! to a rejection and never write. At most one resolution is in flight
//! per resolver instance: events arriving while busy are dropped, which
//! is what keeps rapid repeated detections of the same physical code
//! from double-confirming.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use handover_core::codec;
use handover_core::delivery::RejectReason;
use handover_core::types::DbId;
use handover_db::models::client::Client;
use handover_db::repositories::ClientRepo;
use handover_db::DbPool;
use handover_events::bus::{
    DomainEvent, EventBus, EVENT_DELIVERY_CONFIRMED, EVENT_DELIVERY_REJECTED,
};
use handover_events::scan::ScanReceiver;

/// Outcome of one scan resolution.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The client was found pending and is now marked delivered.
    Confirmed(Client),
    /// The scan did not result in a delivery.
    Rejected(RejectReason),
    /// A resolution was already in flight; the event was ignored.
    Dropped,
}

/// Resolves decoded scan payloads against the record store.
///
/// Both the live-scan loop ([`run`](DeliveryResolver::run)) and manual or
/// simulated entry points go through [`resolve`](DeliveryResolver::resolve),
/// so every path gets the same guards.
pub struct DeliveryResolver {
    pool: DbPool,
    bus: Arc<EventBus>,
    in_flight: AtomicBool,
}

impl DeliveryResolver {
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self {
            pool,
            bus,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Resolve one decoded payload, optionally recording a note with the
    /// confirmation.
    ///
    /// Returns [`Outcome::Dropped`] without touching the store when a
    /// resolution is already in flight. Store failures surface as
    /// `sqlx::Error` and re-arm the resolver.
    pub async fn resolve(&self, raw: &str, note: Option<&str>) -> Result<Outcome, sqlx::Error> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!("resolution in flight, dropping event");
            return Ok(Outcome::Dropped);
        }
        let outcome = self.resolve_armed(raw, note).await;
        self.in_flight.store(false, Ordering::Release);
        outcome
    }

    async fn resolve_armed(&self, raw: &str, note: Option<&str>) -> Result<Outcome, sqlx::Error> {
        // Decoding. Unrecognizable payloads never reach the store.
        let Some(code) = codec::normalize(raw) else {
            return Ok(self.reject(None, RejectReason::InvalidCode));
        };

        // Resolving.
        let Some(client) = ClientRepo::find_by_code(&self.pool, code.as_str()).await? else {
            return Ok(self.reject(None, RejectReason::ClientNotFound));
        };
        if client.delivered {
            return Ok(self.reject(Some(client.id), RejectReason::AlreadyDelivered));
        }

        // Confirming. The delivered=0 guard in the store is the backstop
        // should another writer confirm between the read and this write.
        let Some(delivered) =
            ClientRepo::mark_delivered(&self.pool, client.id, note, Utc::now()).await?
        else {
            return Ok(self.reject(Some(client.id), RejectReason::AlreadyDelivered));
        };

        tracing::info!(client_id = delivered.id, code = %delivered.code, "delivery confirmed");
        self.bus.publish(
            DomainEvent::new(EVENT_DELIVERY_CONFIRMED)
                .with_entity(delivered.id)
                .with_payload(serde_json::json!({ "code": delivered.code })),
        );
        Ok(Outcome::Confirmed(delivered))
    }

    fn reject(&self, entity_id: Option<DbId>, reason: RejectReason) -> Outcome {
        tracing::debug!(reason = reason.as_str(), "scan rejected");
        let mut event = DomainEvent::new(EVENT_DELIVERY_REJECTED)
            .with_payload(serde_json::json!({ "reason": reason.as_str() }));
        if let Some(id) = entity_id {
            event = event.with_entity(id);
        }
        self.bus.publish(event);
        Outcome::Rejected(reason)
    }

    /// Live loop: pull one detection at a time from the mailbox until
    /// every sender is gone.
    ///
    /// Detections with no usable payload are skipped; rejections are
    /// logged and the loop re-arms. A store failure aborts the loop and
    /// reaches the caller.
    pub async fn run(&self, mut scans: ScanReceiver) -> Result<(), sqlx::Error> {
        while let Some(event) = scans.next().await {
            let Some(payload) = event.first_non_blank() else {
                continue;
            };
            match self.resolve(payload, None).await? {
                Outcome::Confirmed(client) => {
                    tracing::info!(code = %client.code, name = %client.full_name(), "delivered");
                }
                Outcome::Rejected(reason) => {
                    tracing::warn!(reason = reason.as_str(), payload, "scan rejected");
                }
                Outcome::Dropped => {}
            }
        }
        Ok(())
    }
}
