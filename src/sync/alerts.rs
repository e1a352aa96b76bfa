//! Durable, user-dismissible low-stock alert queue.
//!
//! Alerts accumulate in arrival order with no deduplication, no length
//! cap, and no automatic expiry; the only removal path is an explicit
//! dismissal by position. A single interior mutex makes concurrent
//! appends and dismissals commute: neither operation can lose the other.

use std::sync::Mutex;

use crate::domain::Alert;

/// Ordered, unbounded queue of low-stock alerts.
#[derive(Debug, Default)]
pub struct AlertAccumulator {
    alerts: Mutex<Vec<Alert>>,
}

impl AlertAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an alert at the end of the queue.
    pub fn push(&self, alert: Alert) {
        self.alerts
            .lock()
            .expect("AlertAccumulator: alerts lock poisoned")
            .push(alert);
    }

    /// Dismiss the alert at `index` in the current queue.
    ///
    /// Returns the removed alert, or `None` if the index is out of range
    /// (for example when a concurrent dismissal got there first).
    pub fn dismiss(&self, index: usize) -> Option<Alert> {
        let mut alerts = self
            .alerts
            .lock()
            .expect("AlertAccumulator: alerts lock poisoned");
        if index < alerts.len() {
            Some(alerts.remove(index))
        } else {
            None
        }
    }

    /// Current queue contents, oldest first.
    pub fn snapshot(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .expect("AlertAccumulator: alerts lock poisoned")
            .clone()
    }

    pub fn len(&self) -> usize {
        self.alerts
            .lock()
            .expect("AlertAccumulator: alerts lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
