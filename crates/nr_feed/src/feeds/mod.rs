use std::path::Path;
use std::sync::Arc;

use nr_core::{ArticleFeed, Result};

use crate::config::FeedConfig;

pub mod memory;
pub mod newsapi;

pub use memory::MemoryFeed;
pub use newsapi::NewsApiFeed;

/// Picks the feed to run against: a fixture file when given, NewsAPI otherwise.
pub async fn create_feed(
    config: Option<FeedConfig>,
    fixture: Option<&Path>,
) -> Result<Arc<dyn ArticleFeed>> {
    if let Some(path) = fixture {
        return Ok(Arc::new(MemoryFeed::from_fixture(path).await?));
    }
    let config = match config {
        Some(config) => config,
        None => FeedConfig::from_env()?,
    };
    Ok(Arc::new(NewsApiFeed::new(config)?))
}
