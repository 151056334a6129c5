use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nr_core::{Article, ArticleFeed, Error, FeedPage, Result, SortMode};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::config::FeedConfig;
use crate::logging::Logger;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    status: Option<String>,
    code: Option<String>,
    message: Option<String>,
    total_results: Option<i64>,
    articles: Option<Vec<Option<WireArticle>>>,
}

#[derive(Deserialize, Default)]
struct WireSource {
    name: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WireArticle {
    source: Option<WireSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

impl From<WireArticle> for Article {
    fn from(wire: WireArticle) -> Self {
        Article {
            source_name: wire.source.and_then(|s| s.name),
            author: wire.author,
            title: wire.title,
            description: wire.description,
            url: wire.url,
            url_to_image: wire.url_to_image,
            published_at: wire.published_at.as_deref().and_then(parse_timestamp),
            content: wire.content,
            popularity: None,
            relevance: None,
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Turns a NewsAPI response body into a [`FeedPage`].
///
/// Missing pieces fall back to empty: no `articles` is an empty page, a
/// missing or negative `totalResults` is zero, a `null` article is an
/// article with no fields. A body with `"status": "error"` is an error.
pub fn parse_response(body: &str) -> Result<FeedPage> {
    let response: WireResponse = serde_json::from_str(body)?;

    if response.status.as_deref() == Some("error") {
        return Err(Error::Feed {
            code: response.code.unwrap_or_else(|| "unknown".to_string()),
            message: response
                .message
                .unwrap_or_else(|| "The feed reported an error".to_string()),
        });
    }

    let articles = response
        .articles
        .unwrap_or_default()
        .into_iter()
        .map(|article| Article::from(article.unwrap_or_default()))
        .collect();
    let total_results = response.total_results.unwrap_or(0).max(0) as u64;

    Ok(FeedPage::new(articles, total_results))
}

/// NewsAPI `sortBy` value for a sort mode.
pub fn sort_by_param(sort: SortMode) -> &'static str {
    match sort {
        SortMode::PublishedAt => "publishedAt",
        SortMode::Popularity => "popularity",
        SortMode::Relevance => "relevancy",
    }
}

pub struct NewsApiFeed {
    client: Client,
    config: FeedConfig,
    logger: Logger,
}

impl fmt::Debug for NewsApiFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiFeed")
            .field("client", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

impl NewsApiFeed {
    pub fn new(config: FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("nr/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            config,
            logger: Logger::new().with_prefix("📡").with_prefix("newsapi"),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.config
            .base_url
            .join(path)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", path, e)))
    }

    fn add_paging(&self, url: &mut Url, page: u32) {
        let mut query = url.query_pairs_mut();
        query.append_pair("page", &page.to_string());
        if let Some(page_size) = self.config.page_size {
            query.append_pair("pageSize", &page_size.to_string());
        }
    }

    pub fn top_headlines_url(&self, keyword: Option<&str>, page: u32) -> Result<Url> {
        let mut url = self.endpoint("top-headlines")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("country", &self.config.country);
            if let Some(keyword) = keyword {
                query.append_pair("q", keyword);
            }
        }
        self.add_paging(&mut url, page);
        Ok(url)
    }

    pub fn everything_url(&self, keyword: &str, sort: SortMode, page: u32) -> Result<Url> {
        let mut url = self.endpoint("everything")?;
        url.query_pairs_mut()
            .append_pair("q", keyword)
            .append_pair("sortBy", sort_by_param(sort));
        self.add_paging(&mut url, page);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<FeedPage> {
        self.logger.debug(&format!("GET {}", url));
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        match parse_response(&body) {
            Err(e @ Error::Feed { .. }) => {
                self.logger.warn(&format!("request failed: {}", e));
                Err(e)
            }
            _ if !status.is_success() => Err(Error::Feed {
                code: status.as_u16().to_string(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string(),
            }),
            result => {
                if let Ok(page) = &result {
                    self.logger.info(&format!(
                        "received {} articles ({} available)",
                        page.articles.len(),
                        page.total_results
                    ));
                }
                result
            }
        }
    }
}

#[async_trait]
impl ArticleFeed for NewsApiFeed {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn fetch_top_headlines(&self, page: u32) -> Result<FeedPage> {
        let url = self.top_headlines_url(None, page)?;
        self.get(url).await
    }

    async fn fetch_by_keyword(&self, keyword: &str, sort: SortMode, page: u32) -> Result<FeedPage> {
        let url = self.everything_url(keyword, sort, page)?;
        self.get(url).await
    }

    async fn fetch_top_headlines_matching(&self, keyword: &str, page: u32) -> Result<FeedPage> {
        let url = self.top_headlines_url(Some(keyword), page)?;
        self.get(url).await
    }
}
