use tracing::{debug, info, warn};

use crate::request::{Query, RequestKind, RequestTicket, RequestTracker, ViewKind};
use crate::store::ResultSetStore;
use crate::types::{Article, FeedPage, SortMode};
use crate::Result;

pub const NO_DATA_MESSAGE: &str = "No data found or API key has been exhausted.";
pub const ENTER_KEYWORD_MESSAGE: &str = "Enter a keyword to search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    List,
    Detail(Box<Article>),
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Discarded,
    Failed,
}

/// A listing screen: owns its result set and decides which fetches to issue
/// and which completed fetches to keep.
#[derive(Debug)]
pub struct ListingView {
    kind: ViewKind,
    store: ResultSetStore,
    tracker: RequestTracker,
    status: ViewStatus,
    screen: Screen,
}

impl ListingView {
    pub fn new(kind: ViewKind) -> Self {
        Self::with_store(kind, ResultSetStore::new())
    }

    pub fn with_store(kind: ViewKind, store: ResultSetStore) -> Self {
        Self {
            kind,
            store,
            tracker: RequestTracker::new(),
            status: ViewStatus::Idle,
            screen: Screen::List,
        }
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn store(&self) -> &ResultSetStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ResultSetStore {
        &mut self.store
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    fn query(&self, page: u32) -> Query {
        Query {
            view: self.kind,
            keyword: self.store.keyword().to_string(),
            sort: self.store.sort_mode(),
            page,
        }
    }

    fn issue_replace(&mut self) -> RequestTicket {
        let ticket = self.tracker.issue(RequestKind::Replace, self.query(1));
        if self.store.is_loading_more() {
            self.store.set_loading_more(false);
        }
        self.status = ViewStatus::Loading;
        ticket
    }

    /// Initial load. The search view waits for a keyword instead.
    pub fn start(&mut self) -> Option<RequestTicket> {
        match self.kind {
            ViewKind::Headlines => Some(self.issue_replace()),
            ViewKind::Search => None,
        }
    }

    /// Records a new keyword and returns the fetch to run for it, if any.
    /// Headlines keywords are lowercased; searches keep the typed case.
    pub fn change_keyword(&mut self, raw: &str) -> Option<RequestTicket> {
        let keyword = match self.kind {
            ViewKind::Headlines => raw.trim().to_lowercase(),
            ViewKind::Search => raw.trim().to_string(),
        };
        self.store.set_keyword(keyword);

        if self.kind == ViewKind::Search && self.store.keyword().is_empty() {
            // Bump the sequence so any search still in flight is dropped.
            self.tracker.issue(RequestKind::Replace, self.query(1));
            self.store.set_loading_more(false);
            self.store.replace(Vec::new(), 0);
            self.status = ViewStatus::Idle;
            return None;
        }
        Some(self.issue_replace())
    }

    /// Returns the next-page fetch, unless nothing is left, one is already
    /// running, or the list is still waiting for its first page.
    pub fn request_more(&mut self) -> Option<RequestTicket> {
        if !self.can_load_more() || self.store.is_loading_more() {
            return None;
        }
        self.store.set_loading_more(true);
        let page = self.store.page() + 1;
        Some(self.tracker.issue(RequestKind::Append, self.query(page)))
    }

    pub fn change_sort(&mut self, mode: SortMode) {
        self.store.set_sort_mode(mode);
    }

    pub fn complete(&mut self, ticket: RequestTicket, result: Result<FeedPage>) -> Completion {
        if !self.tracker.is_latest(&ticket) {
            debug!("Dropping superseded {:?} #{} for {:?}", ticket.kind, ticket.seq, ticket.query.keyword);
            return Completion::Discarded;
        }

        if !ticket.matches(self.store.state()) {
            debug!("Dropping stale {:?} #{} for {:?}", ticket.kind, ticket.seq, ticket.query.keyword);
            if ticket.kind == RequestKind::Append {
                self.store.set_loading_more(false);
            }
            return Completion::Discarded;
        }

        match (ticket.kind, result) {
            (RequestKind::Replace, Ok(page)) => {
                info!("📰 Loaded {} of {} articles", page.articles.len(), page.total_results);
                let has_items = !page.articles.is_empty();
                self.store.replace(page.articles, page.total_results);
                if has_items {
                    let mode = self.store.sort_mode();
                    self.store.set_sort_mode(mode);
                }
                self.status = ViewStatus::Ready;
                Completion::Applied
            }
            (RequestKind::Append, Ok(page)) => {
                info!("📰 Loaded page {} ({} articles)", ticket.query.page, page.articles.len());
                self.store.append_page(page.articles);
                self.status = ViewStatus::Ready;
                Completion::Applied
            }
            (kind, Err(e)) => {
                warn!("⚠️ Fetch failed: {}", e);
                match kind {
                    RequestKind::Append => self.store.set_loading_more(false),
                    // The list on screen belongs to the previous keyword.
                    RequestKind::Replace => self.store.replace(Vec::new(), 0),
                }
                self.status = ViewStatus::Failed(e.to_string());
                Completion::Failed
            }
        }
    }

    /// Whether the load-more control should be shown.
    pub fn can_load_more(&self) -> bool {
        self.status != ViewStatus::Loading && self.store.has_more()
    }

    /// The sort selector only makes sense for an active search with results.
    pub fn can_sort(&self) -> bool {
        self.status != ViewStatus::Loading
            && !self.store.keyword().is_empty()
            && !self.store.items().is_empty()
    }

    pub fn empty_message(&self) -> &'static str {
        if self.kind == ViewKind::Search && self.store.keyword().is_empty() {
            ENTER_KEYWORD_MESSAGE
        } else {
            NO_DATA_MESSAGE
        }
    }

    /// Switches to the detail screen for the article at `index`.
    pub fn open(&mut self, index: usize) -> Option<&Article> {
        let article = self.store.items().get(index)?.clone();
        self.screen = Screen::Detail(Box::new(article));
        match &self.screen {
            Screen::Detail(article) => Some(article.as_ref()),
            Screen::List => None,
        }
    }

    pub fn back(&mut self) {
        self.screen = Screen::List;
    }
}
