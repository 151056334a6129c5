pub mod config;
pub mod feeds;
pub mod logging;

pub use config::FeedConfig;
pub use feeds::{create_feed, MemoryFeed, NewsApiFeed};
pub use logging::{init_logging, Logger};

pub mod prelude {
    pub use super::feeds::{MemoryFeed, NewsApiFeed};
    pub use super::FeedConfig;
    pub use nr_core::{Article, ArticleFeed, FeedPage, Result, Error};
}
