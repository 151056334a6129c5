//! Last-request-wins bookkeeping for in-flight feed fetches.

use crate::feed::ArticleFeed;
use crate::store::ResultSet;
use crate::types::{FeedPage, SortMode};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Top headlines, optionally narrowed by keyword.
    Headlines,
    /// Full search; nothing is shown until a keyword is entered.
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Fetches page 1 and replaces the list.
    Replace,
    /// Fetches the next page and appends it.
    Append,
}

/// What a fetch was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub view: ViewKind,
    pub keyword: String,
    pub sort: SortMode,
    pub page: u32,
}

impl Query {
    pub async fn run(&self, feed: &dyn ArticleFeed) -> Result<FeedPage> {
        match (self.view, self.keyword.is_empty()) {
            (ViewKind::Headlines, true) => feed.fetch_top_headlines(self.page).await,
            (ViewKind::Headlines, false) => {
                feed.fetch_top_headlines_matching(&self.keyword, self.page).await
            }
            (ViewKind::Search, true) => Ok(FeedPage::empty()),
            (ViewKind::Search, false) => {
                feed.fetch_by_keyword(&self.keyword, self.sort, self.page).await
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub seq: u64,
    pub kind: RequestKind,
    pub query: Query,
}

impl RequestTicket {
    /// Whether the store is still waiting for what this ticket asked for.
    pub fn matches(&self, state: &ResultSet) -> bool {
        if self.query.keyword != state.keyword {
            return false;
        }
        match self.kind {
            RequestKind::Replace => true,
            RequestKind::Append => {
                self.query.sort == state.sort_mode && self.query.page == state.page + 1
            }
        }
    }

    pub async fn execute(self, feed: &dyn ArticleFeed) -> (RequestTicket, Result<FeedPage>) {
        let result = self.query.run(feed).await;
        (self, result)
    }
}

/// Hands out monotonically increasing sequence numbers and remembers the
/// latest one per [`RequestKind`].
#[derive(Debug, Default)]
pub struct RequestTracker {
    next_seq: u64,
    latest_replace: Option<u64>,
    latest_append: Option<u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issuing a `Replace` also supersedes any pending `Append`.
    pub fn issue(&mut self, kind: RequestKind, query: Query) -> RequestTicket {
        self.next_seq += 1;
        let seq = self.next_seq;
        match kind {
            RequestKind::Replace => {
                self.latest_replace = Some(seq);
                self.latest_append = None;
            }
            RequestKind::Append => self.latest_append = Some(seq),
        }
        RequestTicket { seq, kind, query }
    }

    pub fn is_latest(&self, ticket: &RequestTicket) -> bool {
        let latest = match ticket.kind {
            RequestKind::Replace => self.latest_replace,
            RequestKind::Append => self.latest_append,
        };
        latest == Some(ticket.seq)
    }

    /// Sequence number of the newest ticket of any kind.
    pub fn last_issued(&self) -> u64 {
        self.next_seq
    }
}
