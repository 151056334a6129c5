use async_trait::async_trait;

use crate::types::{FeedPage, SortMode};
use crate::Result;

#[async_trait]
pub trait ArticleFeed: Send + Sync {
    /// Name used in log lines
    fn name(&self) -> &str;

    /// Fetch a page of top headlines
    async fn fetch_top_headlines(&self, page: u32) -> Result<FeedPage>;

    /// Search every article matching `keyword`, ordered by `sort` on the feed side
    async fn fetch_by_keyword(&self, keyword: &str, sort: SortMode, page: u32) -> Result<FeedPage>;

    /// Fetch top headlines narrowed by `keyword`
    async fn fetch_top_headlines_matching(&self, keyword: &str, page: u32) -> Result<FeedPage> {
        self.fetch_by_keyword(keyword, SortMode::PublishedAt, page).await
    }
}
