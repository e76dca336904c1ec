//! In-process eventing for the handover tracker.
//!
//! - [`EventBus`] — publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, carrying [`DomainEvent`]s.
//! - [`scan`] — the bounded mailbox between the external code-detection
//!   collaborator and the delivery resolver.

pub mod bus;
pub mod scan;

pub use bus::{DomainEvent, EventBus};
pub use scan::{scan_channel, ScanEvent, ScanReceiver, ScanSender};
