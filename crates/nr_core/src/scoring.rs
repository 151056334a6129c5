//! Synthetic scores used by the client-side sorts.
//!
//! Neither score reflects real popularity or relevance. Both are small
//! integers with many ties, so a popularity order and a relevance order can
//! come out identical for the same page of results.

use std::cmp::Ordering;

use rand::Rng;

use crate::types::Article;

pub const POPULARITY_CEILING: u32 = 100;

/// Counts whitespace-separated tokens of `text` that contain `keyword`,
/// ignoring case. An exact match is a containment too.
pub fn keyword_count(text: &str, keyword: &str) -> u32 {
    let keyword = keyword.to_lowercase();
    text.split_whitespace()
        .filter(|token| token.to_lowercase().contains(&keyword))
        .count() as u32
}

pub fn relevance(article: &Article, keyword: &str) -> u32 {
    [
        article.source_name.as_deref(),
        article.title.as_deref(),
        article.description.as_deref(),
        article.content.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(|text| keyword_count(text, keyword))
    .sum()
}

pub fn random_popularity<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(0..POPULARITY_CEILING)
}

/// Newest first, undated articles last.
pub fn by_published_at_desc(a: &Article, b: &Article) -> Ordering {
    match (a.published_at, b.published_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn by_popularity_desc(a: &Article, b: &Article) -> Ordering {
    b.popularity.unwrap_or(0).cmp(&a.popularity.unwrap_or(0))
}

pub fn by_relevance_desc(a: &Article, b: &Article) -> Ordering {
    b.relevance.unwrap_or(0).cmp(&a.relevance.unwrap_or(0))
}
