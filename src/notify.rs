//! Fan-out of JSON notifications to live subscribers
//!
//! Delivery is fire-and-forget. A subscriber that drops its receiver stays
//! registered until the next [`SubscriberHub::cleanup_closed`] pass.

use crate::logging::{StructuredLogger, get_logger};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// Sink for broadcast notifications
pub trait Notifier {
    fn broadcast(&self, message: &str);
}

#[derive(Clone)]
pub struct SubscriberHub {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<String>>>>,
    logger: StructuredLogger,
}

impl Default for SubscriberHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriberHub {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            logger: get_logger("notify"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<String>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        let count = {
            let mut subs = self.lock();
            subs.push(tx);
            subs.len()
        };
        self.logger.debug(&format!("Subscriber added ({} registered)", count));
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    /// Drop subscribers whose receiver is gone; returns how many were removed
    pub fn cleanup_closed(&self) -> usize {
        let mut subs = self.lock();
        let before = subs.len();
        subs.retain(|tx| !tx.is_closed());
        let removed = before - subs.len();
        drop(subs);
        if removed > 0 {
            self.logger.debug(&format!("Removed {} closed subscribers", removed));
        }
        removed
    }
}

impl Notifier for SubscriberHub {
    fn broadcast(&self, message: &str) {
        for tx in self.lock().iter() {
            // Closed receivers are swept by cleanup_closed
            let _ = tx.send(message.to_string());
        }
    }
}
