//! Page-token pagination shared by the list endpoints.

use serde::Deserialize;

/// One page of a paginated list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page<T> {
    // A default path (rather than bare `default`) keeps the derive from
    // requiring `T: Default`.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

/// Cursor over an opaque page-token sequence.
///
/// Owns the pagination state for one list call: each call to
/// [`next_request`](Self::next_request) yields the `pageToken` to send
/// (none for the first page), and [`record`](Self::record) feeds back the
/// server's `nextPageToken`. A fresh cursor is created per list call, so
/// pagination restarts every time.
#[derive(Debug, Default)]
pub(crate) struct PageCursor {
    next: Option<String>,
    started: bool,
}

impl PageCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the page token for the next request, or `None` when the
    /// sequence is exhausted. The inner `Option` is the `pageToken` query
    /// value (absent on the first request).
    pub fn next_request(&mut self) -> Option<Option<String>> {
        if !self.started {
            self.started = true;
            return Some(None);
        }
        self.next.take().map(Some)
    }

    /// Records the `nextPageToken` from the page just fetched.
    pub fn record(&mut self, next_page_token: Option<String>) {
        self.next = next_page_token;
    }
}
