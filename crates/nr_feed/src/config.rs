use std::fmt;

use nr_core::{Error, Result};
use url::Url;

pub const API_KEY_ENV: &str = "NEWS_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/";
pub const DEFAULT_COUNTRY: &str = "us";

#[derive(Clone)]
pub struct FeedConfig {
    pub api_key: String,
    pub base_url: Url,
    pub country: String,
    pub page_size: Option<u32>,
}

impl fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("country", &self.country)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl FeedConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config(format!("{} is empty", API_KEY_ENV)));
        }
        Ok(Self {
            api_key,
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            country: DEFAULT_COUNTRY.to_string(),
            page_size: None,
        })
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", API_KEY_ENV)))?;
        Self::new(api_key)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Endpoint paths are joined onto the base, so it must end with a slash.
fn parse_base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&normalized).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidUrl(format!("{}: not a base URL", raw)));
    }
    Ok(url)
}
