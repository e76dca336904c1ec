//! Bounded mailbox between the external code-detection collaborator and
//! the delivery resolver.
//!
//! The detector never calls into the resolver. It offers decoded values
//! through [`ScanSender::offer`]; the resolver pulls one event at a time
//! from [`ScanReceiver::next`]. The channel is bounded, so when the
//! resolver falls behind new detections are dropped at the sender. The
//! collaborator is also expected to pause while a resolution is in
//! flight, but that contract is cooperative; the bounded buffer and the
//! resolver's own guard are the actual safety mechanisms.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// Default mailbox depth: a single in-flight detection.
pub const DEFAULT_SCAN_CAPACITY: usize = 1;

/// One physical detection event: zero or more decoded payloads.
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub values: Vec<String>,
    pub detected_at: DateTime<Utc>,
}

impl ScanEvent {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values,
            detected_at: Utc::now(),
        }
    }

    /// The single payload the core consumes: the first non-blank value.
    pub fn first_non_blank(&self) -> Option<&str> {
        self.values
            .iter()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }
}

/// Create a bounded scan mailbox.
pub fn scan_channel(capacity: usize) -> (ScanSender, ScanReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (ScanSender { tx }, ScanReceiver { rx })
}

/// Producer half, handed to the detection collaborator.
#[derive(Clone)]
pub struct ScanSender {
    tx: mpsc::Sender<ScanEvent>,
}

impl ScanSender {
    /// Offer a detection without blocking.
    ///
    /// Returns `false` when the mailbox is full (or the receiver is
    /// gone) and the event was dropped.
    pub fn offer(&self, event: ScanEvent) -> bool {
        self.tx.try_send(event).is_ok()
    }
}

/// Consumer half, owned by the resolver loop.
pub struct ScanReceiver {
    rx: mpsc::Receiver<ScanEvent>,
}

impl ScanReceiver {
    /// Wait for the next detection. `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<ScanEvent> {
        self.rx.recv().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
