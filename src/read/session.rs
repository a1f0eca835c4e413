//! Read session
//!
//! Per-run mutable state shared by the batch and incremental readers: the
//! pagination cursor, the high-water mark, cancellation and the clock.

use crate::state::SyncState;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// Source of "now" for high-water-mark updates
pub type Clock = fn() -> DateTime<Utc>;

/// Mutable state of one read run
///
/// Owned by the caller and passed `&mut` into each read. Concurrent reads
/// need separate sessions.
#[derive(Debug, Clone)]
pub struct ReadSession {
    after: Option<String>,
    high_water_mark: DateTime<Utc>,
    cancel: CancellationToken,
    clock: Clock,
}

impl ReadSession {
    /// Session starting at the current time
    pub fn new() -> Self {
        Self {
            after: None,
            high_water_mark: Utc::now(),
            cancel: CancellationToken::new(),
            clock: Utc::now,
        }
    }

    /// Session seeded from a persisted offset, falling back to now
    pub fn from_state(state: &SyncState) -> Self {
        let session = Self::new();
        match state.high_water_mark {
            Some(mark) => session.with_high_water_mark(mark),
            None => session,
        }
    }

    /// Start from the given high-water mark
    #[must_use]
    pub fn with_high_water_mark(mut self, mark: DateTime<Utc>) -> Self {
        self.high_water_mark = mark;
        self
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Use an externally owned cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the read at the next loop boundary
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the host still wants rows
    pub fn is_alive(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Cursor of the most recently consumed page
    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    /// Current high-water mark
    pub fn high_water_mark(&self) -> DateTime<Utc> {
        self.high_water_mark
    }

    /// Offset to persist for the next run
    pub fn to_state(&self, mut state: SyncState) -> SyncState {
        state.high_water_mark = Some(self.high_water_mark);
        state
    }

    pub(crate) fn set_after(&mut self, cursor: Option<String>) {
        self.after = cursor;
    }

    pub(crate) fn reset_cursor(&mut self) {
        self.after = None;
    }

    /// Current time according to the session clock
    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Move the high-water mark to now
    pub(crate) fn touch(&mut self) {
        self.high_water_mark = self.now();
    }
}

impl Default for ReadSession {
    fn default() -> Self {
        Self::new()
    }
}
