use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::scoring;
use crate::types::{Article, SortMode};

/// The list of articles a view is showing, plus its pagination and sort state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub items: Vec<Article>,
    pub total_available: u64,
    pub page: u32,
    pub keyword: String,
    pub sort_mode: SortMode,
    pub is_loading_more: bool,
}

impl Default for ResultSet {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_available: 0,
            page: 1,
            keyword: String::new(),
            sort_mode: SortMode::PublishedAt,
            is_loading_more: false,
        }
    }
}

impl ResultSet {
    /// Whether the load-more affordance should be offered.
    pub fn has_more(&self) -> bool {
        (self.items.len() as u64) < self.total_available
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Replaced,
    Appended { count: usize },
    KeywordChanged,
    Sorted(SortMode),
    LoadingMore(bool),
}

pub trait StoreObserver: Send + Sync {
    fn on_change(&self, change: StoreChange, state: &ResultSet);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owns a [`ResultSet`] and applies every mutation to it.
///
/// Mutations never fail: whatever the feed handed over is taken as is.
/// Observers are notified synchronously after each change.
pub struct ResultSetStore {
    state: ResultSet,
    rng: StdRng,
    observers: Vec<(SubscriptionId, Arc<dyn StoreObserver>)>,
    next_subscription: u64,
}

impl fmt::Debug for ResultSetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSetStore")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for ResultSetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultSetStore {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Popularity scores drawn from a seeded generator, for reproducible orders.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: ResultSet::default(),
            rng,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &ResultSet {
        &self.state
    }

    pub fn items(&self) -> &[Article] {
        &self.state.items
    }

    pub fn keyword(&self) -> &str {
        &self.state.keyword
    }

    pub fn sort_mode(&self) -> SortMode {
        self.state.sort_mode
    }

    pub fn page(&self) -> u32 {
        self.state.page
    }

    pub fn total_available(&self) -> u64 {
        self.state.total_available
    }

    pub fn is_loading_more(&self) -> bool {
        self.state.is_loading_more
    }

    pub fn has_more(&self) -> bool {
        self.state.has_more()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn StoreObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    fn notify(&self, change: StoreChange) {
        for (_, observer) in &self.observers {
            observer.on_change(change, &self.state);
        }
    }

    /// Replaces the list with a freshly fetched first page.
    /// Installs a fresh first page; the page counter restarts at 1.
    pub fn replace(&mut self, items: Vec<Article>, total_available: u64) {
        self.state.items = items;
        self.state.total_available = total_available;
        self.state.page = 1;
        self.notify(StoreChange::Replaced);
    }

    /// Appends the next page. Callers check [`has_more`](Self::has_more) first.
    pub fn append_page(&mut self, new_items: Vec<Article>) {
        let count = new_items.len();
        self.state.items.extend(new_items);
        self.state.page += 1;
        self.state.is_loading_more = false;
        self.notify(StoreChange::Appended { count });
    }

    /// Records the desired query. Fetching is left to the owning view.
    pub fn set_keyword(&mut self, value: impl Into<String>) {
        self.state.keyword = value.into();
        self.state.page = 1;
        if self.state.keyword.is_empty() {
            self.state.sort_mode = SortMode::PublishedAt;
        }
        self.notify(StoreChange::KeywordChanged);
    }

    pub fn set_loading_more(&mut self, flag: bool) {
        self.state.is_loading_more = flag;
        self.notify(StoreChange::LoadingMore(flag));
    }

    /// Reorders the current items. The set of items never changes.
    pub fn set_sort_mode(&mut self, mode: SortMode) {
        match mode {
            SortMode::PublishedAt => {
                self.state.items.sort_by(scoring::by_published_at_desc);
            }
            SortMode::Popularity => {
                for article in self.state.items.iter_mut() {
                    if article.popularity.is_none() {
                        article.popularity = Some(scoring::random_popularity(&mut self.rng));
                    }
                }
                self.state.items.sort_by(scoring::by_popularity_desc);
            }
            SortMode::Relevance => {
                let keyword = self.state.keyword.clone();
                for article in self.state.items.iter_mut() {
                    article.relevance = Some(scoring::relevance(article, &keyword));
                }
                self.state.items.sort_by(scoring::by_relevance_desc);
            }
        }
        self.state.sort_mode = mode;
        self.notify(StoreChange::Sorted(mode));
    }
}
