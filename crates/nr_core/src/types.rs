use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub source_name: Option<String>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub content: Option<String>,
    /// Synthetic score, assigned on the first popularity sort and kept afterwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<u32>,
    /// Synthetic score, overwritten on every relevance sort.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<u32>,
}

impl Article {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn display_source(&self) -> &str {
        self.source_name.as_deref().unwrap_or("N/A")
    }

    /// `author | Month DD YYYY`, either part may be missing.
    pub fn byline(&self) -> String {
        let mut line = String::new();
        if let Some(author) = self.author.as_deref() {
            line.push_str(author);
            line.push_str(" | ");
        }
        if let Some(published_at) = self.published_at {
            line.push_str(&published_at.format("%B %d %Y").to_string());
        }
        line
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    #[default]
    PublishedAt,
    Popularity,
    Relevance,
}

impl SortMode {
    pub const ALL: [SortMode; 3] = [SortMode::PublishedAt, SortMode::Popularity, SortMode::Relevance];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::PublishedAt => "publishedAt",
            SortMode::Popularity => "popularity",
            SortMode::Relevance => "relevance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortMode::PublishedAt => "Published Date",
            SortMode::Popularity => "Popularity",
            SortMode::Relevance => "Relevance",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "publishedat" | "published" | "date" => Ok(SortMode::PublishedAt),
            "popularity" | "popular" => Ok(SortMode::Popularity),
            "relevance" | "relevancy" | "relevant" => Ok(SortMode::Relevance),
            other => Err(format!("Invalid sort mode: {}", other)),
        }
    }
}

/// One page of results as returned by a feed, already normalized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub articles: Vec<Article>,
    pub total_results: u64,
}

impl FeedPage {
    pub fn new(articles: Vec<Article>, total_results: u64) -> Self {
        Self { articles, total_results }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sort_mode_from_str() {
        assert_eq!("publishedAt".parse::<SortMode>().unwrap(), SortMode::PublishedAt);
        assert_eq!("Popularity".parse::<SortMode>().unwrap(), SortMode::Popularity);
        assert_eq!("relevancy".parse::<SortMode>().unwrap(), SortMode::Relevance);
        assert!("newest".parse::<SortMode>().is_err());
    }

    #[test]
    fn test_byline() {
        let mut article = Article::titled("Test");
        article.published_at = Some(Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap());
        assert_eq!(article.byline(), "March 05 2024");

        article.author = Some("Jane Doe".to_string());
        assert_eq!(article.byline(), "Jane Doe | March 05 2024");

        article.published_at = None;
        assert_eq!(article.byline(), "Jane Doe | ");
    }

    #[test]
    fn test_display_source_defaults() {
        let article = Article::default();
        assert_eq!(article.display_source(), "N/A");
        assert_eq!(article.display_title(), "");
    }

    #[test]
    fn test_article_json_skips_unset_scores() {
        let json = serde_json::to_value(Article::titled("Test")).unwrap();
        assert!(json.get("popularity").is_none());
        assert_eq!(json["title"], "Test");
    }
}
