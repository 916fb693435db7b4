//! Snapshot cache
//!
//! Discount rules fetched for a session are reused until they go stale.
//! Staleness is explicit: a fetch timestamp plus a time-to-live, checked
//! against the caller's clock.

use jiff::{SignedDuration, Timestamp};

use crate::discounts::DiscountRule;

/// A TTL-bound snapshot of fetched discount rules.
#[derive(Debug, Clone)]
pub struct DiscountCache {
    rules: Vec<DiscountRule>,
    fetched_at: Option<Timestamp>,
    ttl: SignedDuration,
}

impl DiscountCache {
    /// Create an empty cache with the given time-to-live.
    #[must_use]
    pub fn new(ttl: SignedDuration) -> Self {
        Self {
            rules: Vec::new(),
            fetched_at: None,
            ttl,
        }
    }

    /// Replace the cached rules and mark them fetched at `now`.
    pub fn store(&mut self, rules: Vec<DiscountRule>, now: Timestamp) {
        self.rules = rules;
        self.fetched_at = Some(now);
    }

    /// Return the cached rules, or `None` when never fetched or stale.
    pub fn get(&self, now: Timestamp) -> Option<&[DiscountRule]> {
        if self.is_stale(now) {
            return None;
        }

        Some(&self.rules)
    }

    /// Whether the snapshot is missing or older than the time-to-live.
    pub fn is_stale(&self, now: Timestamp) -> bool {
        self.fetched_at
            .is_none_or(|fetched_at| now.duration_since(fetched_at) > self.ttl)
    }

    /// Drop the snapshot so the next read refetches.
    pub fn invalidate(&mut self) {
        self.fetched_at = None;
        self.rules.clear();
    }
}
