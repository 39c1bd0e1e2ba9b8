//! Debounced "load older" paging for chat history and journals.
//!
//! Scroll events push a deadline forward; when the quiet period elapses and
//! the view was left at its boundary, one page request fires with the next
//! offset. An empty page means there is nothing older and ends paging for
//! the rest of the session.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct HistoryPager {
    debounce: Duration,
    offset: u32,
    deadline: Option<Instant>,
    at_boundary: bool,
    loading: bool,
    exhausted: bool,
}

impl HistoryPager {
    #[must_use]
    pub fn new(debounce: Duration) -> Self {
        Self { debounce, offset: 0, deadline: None, at_boundary: false, loading: false, exhausted: false }
    }

    /// Record a scroll event. Restarts the quiet period.
    pub fn on_scroll(&mut self, now: Instant, at_boundary: bool) {
        if self.exhausted {
            return;
        }
        self.deadline = Some(now + self.debounce);
        self.at_boundary = at_boundary;
    }

    /// Fire the pending request if its quiet period has elapsed.
    ///
    /// Returns the offset to request.
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        if !self.at_boundary || self.exhausted {
            return None;
        }
        self.offset += 1;
        self.loading = true;
        Some(self.offset)
    }

    /// When [`Self::poll`] next has something to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Record that a page of `len` entries arrived.
    pub fn on_page(&mut self, len: usize) {
        self.loading = false;
        if len == 0 {
            self.exhausted = true;
            self.deadline = None;
        }
    }

    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// A request was sent and its page has not arrived yet.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
#[path = "pager_test.rs"]
mod tests;
