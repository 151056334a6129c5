use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use nr_core::scoring::{by_published_at_desc, keyword_count};
use nr_core::{Article, ArticleFeed, Error, FeedPage, Result, SortMode};

use crate::feeds::newsapi::parse_response;
use crate::logging::Logger;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Serves a fixed list of articles, paged like the real API.
///
/// Used for offline browsing from a fixture file and in tests, where the
/// delay and failure knobs make races and error paths reproducible.
#[derive(Debug)]
pub struct MemoryFeed {
    articles: Vec<Article>,
    page_size: usize,
    delay: Option<Duration>,
    failure: Option<String>,
    calls: AtomicUsize,
    logger: Logger,
}

impl MemoryFeed {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles,
            page_size: DEFAULT_PAGE_SIZE,
            delay: None,
            failure: None,
            calls: AtomicUsize::new(0),
            logger: Logger::new().with_prefix("🗂️").with_prefix("memory"),
        }
    }

    /// Loads a NewsAPI-shaped JSON response saved to disk.
    pub async fn from_fixture(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let body = tokio::fs::read_to_string(path).await?;
        let page = parse_response(&body)?;
        let feed = Self::new(page.articles);
        feed.logger.info(&format!("loaded {} articles from {}", feed.articles.len(), path.display()));
        Ok(feed)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every fetch fails with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn matching(&self, keyword: &str) -> Vec<Article> {
        self.articles
            .iter()
            .filter(|article| {
                [
                    article.source_name.as_deref(),
                    article.title.as_deref(),
                    article.description.as_deref(),
                    article.content.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|text| keyword_count(text, keyword) > 0)
            })
            .cloned()
            .collect()
    }

    fn paginate(&self, articles: Vec<Article>, page: u32) -> FeedPage {
        let total_results = articles.len() as u64;
        let start = (page.max(1) as usize - 1).saturating_mul(self.page_size);
        let articles = articles
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect();
        FeedPage::new(articles, total_results)
    }

    async fn serve(&self, articles: Vec<Article>, page: u32) -> Result<FeedPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(Error::Feed {
                code: "memoryFailure".to_string(),
                message: message.clone(),
            });
        }
        let page = self.paginate(articles, page);
        self.logger.debug(&format!("serving {} articles", page.articles.len()));
        Ok(page)
    }
}

#[async_trait]
impl ArticleFeed for MemoryFeed {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_top_headlines(&self, page: u32) -> Result<FeedPage> {
        self.serve(self.articles.clone(), page).await
    }

    async fn fetch_by_keyword(&self, keyword: &str, sort: SortMode, page: u32) -> Result<FeedPage> {
        let mut articles = self.matching(keyword);
        if sort == SortMode::PublishedAt {
            articles.sort_by(by_published_at_desc);
        }
        self.serve(articles, page).await
    }

    async fn fetch_top_headlines_matching(&self, keyword: &str, page: u32) -> Result<FeedPage> {
        let articles = self.matching(keyword);
        self.serve(articles, page).await
    }
}
