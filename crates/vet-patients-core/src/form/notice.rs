//! Transient success notices.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

/// Default time a notice stays visible.
pub const DEFAULT_NOTICE_DURATION_MS: u64 = 3_000;

/// Longest notice duration accepted (one hour). Longer values are clamped.
pub const MAX_NOTICE_DURATION_MS: u64 = 60 * 60 * 1000;

/// A message shown until `expires_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    pub posted_at: DateTime<Local>,
    pub expires_at: DateTime<Local>,
}

impl Notice {
    pub fn is_visible_at(&self, now: DateTime<Local>) -> bool {
        now < self.expires_at
    }
}

/// Holds at most one notice. Posting replaces whatever was there, so an
/// older notice's expiry never clears a newer one.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    duration: Duration,
    current: Option<Notice>,
}

impl NoticeBoard {
    /// Durations are clamped to `0..=MAX_NOTICE_DURATION_MS`.
    pub fn new(duration: Duration) -> Self {
        let max = Duration::milliseconds(MAX_NOTICE_DURATION_MS as i64);
        Self {
            duration: duration.clamp(Duration::zero(), max),
            current: None,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::milliseconds(millis.min(MAX_NOTICE_DURATION_MS) as i64))
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Show `message` starting at `now`.
    pub fn post(&mut self, message: impl Into<String>, now: DateTime<Local>) -> &Notice {
        self.current.insert(Notice {
            message: message.into(),
            posted_at: now,
            // Past the end of the calendar the notice is never shown.
            expires_at: now.checked_add_signed(self.duration).unwrap_or(now),
        })
    }

    /// The visible notice at `now`, if any.
    pub fn current(&self, now: DateTime<Local>) -> Option<&Notice> {
        self.current
            .as_ref()
            .filter(|notice| notice.is_visible_at(now))
    }

    /// Drop the notice once it has expired.
    pub fn clear_expired(&mut self, now: DateTime<Local>) -> bool {
        if self.current.as_ref().is_some_and(|n| !n.is_visible_at(now)) {
            self.current = None;
            return true;
        }
        false
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::from_millis(DEFAULT_NOTICE_DURATION_MS)
    }
}
