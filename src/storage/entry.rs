//! Cache Entry
//!
//! A value plus two absolute deadlines: the end of its freshness window and its
//! hard expiration.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;

/// Relative lifetime windows, turned into absolute deadlines at insert time.
///
/// The two windows are independent. A freshness window longer than the hard
/// expiration has no visible effect, since the entry disappears first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ttl {
    /// How long `load` reports the entry as fresh (None = until expiration)
    pub fresh_for: Option<Duration>,
    /// How long until the entry is gone (None = never)
    pub expire_after: Option<Duration>,
}

impl Ttl {
    /// Never stale, never expires
    pub fn never() -> Self {
        Self::default()
    }

    pub fn expire_after(ttl: Duration) -> Self {
        Self {
            fresh_for: None,
            expire_after: Some(ttl),
        }
    }

    pub fn with_fresh_for(mut self, window: Duration) -> Self {
        self.fresh_for = Some(window);
        self
    }
}

/// Entry in the store with value and deadlines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<V> {
    value: V,
    expires_at: Option<DateTime<Utc>>,
    fresh_until: Option<DateTime<Utc>>,
}

impl<V> Entry<V> {
    /// Entry that never expires and never goes stale
    pub fn new(value: V) -> Self {
        Self {
            value,
            expires_at: None,
            fresh_until: None,
        }
    }

    /// Build an entry whose windows start at `now`
    pub fn with_ttl(value: V, ttl: Ttl, now: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at: ttl.expire_after.and_then(|d| deadline(now, d)),
            fresh_until: ttl.fresh_for.and_then(|d| deadline(now, d)),
        }
    }

    pub fn with_expiration(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Hard expiration as Unix seconds. Zero or negative means no expiration.
    pub fn with_expiration_unix(mut self, secs: i64) -> Self {
        self.expires_at = if secs > 0 {
            DateTime::from_timestamp(secs, 0)
        } else {
            None
        };
        self
    }

    pub fn with_fresh_until(mut self, at: DateTime<Utc>) -> Self {
        self.fresh_until = Some(at);
        self
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Hard expiration as Unix seconds, 0 when the entry never expires
    pub fn expiration_unix(&self) -> i64 {
        self.expires_at.map(|t| t.timestamp()).unwrap_or(0)
    }

    pub fn fresh_until(&self) -> Option<DateTime<Utc>> {
        self.fresh_until
    }

    /// Expired entries are invisible to lookups from this instant on
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|t| now >= t).unwrap_or(false)
    }

    /// Past the freshness window, or expired outright
    #[inline]
    pub fn is_outdated_at(&self, now: DateTime<Utc>) -> bool {
        self.is_expired_at(now) || self.fresh_until.map(|t| now >= t).unwrap_or(false)
    }
}

/// `None` when the deadline is past the representable range, which reads as "never".
fn deadline(now: DateTime<Utc>, after: Duration) -> Option<DateTime<Utc>> {
    TimeDelta::from_std(after)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
}
