use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nr_core::{
    Article, ArticleFeed, Completion, Debouncer, Error, FeedPage, ListingView, Result, SortMode,
    ViewKind,
};
use tokio::task::JoinSet;

/// Answers keyword searches after a per-keyword delay.
struct SlowFeed {
    delays: HashMap<String, Duration>,
}

#[async_trait]
impl ArticleFeed for SlowFeed {
    fn name(&self) -> &str {
        "slow"
    }

    async fn fetch_top_headlines(&self, page: u32) -> Result<FeedPage> {
        Ok(FeedPage::new(vec![Article::titled(format!("headline p{}", page))], 2))
    }

    async fn fetch_by_keyword(&self, keyword: &str, _sort: SortMode, page: u32) -> Result<FeedPage> {
        if keyword == "broken" {
            return Err(Error::Feed {
                code: "apiKeyExhausted".to_string(),
                message: "You have made too many requests".to_string(),
            });
        }
        let delay = self.delays.get(keyword).copied().unwrap_or_default();
        tokio::time::sleep(delay).await;
        Ok(FeedPage::new(vec![Article::titled(format!("{} p{}", keyword, page))], 10))
    }
}

fn feed(delays: &[(&str, u64)]) -> Arc<dyn ArticleFeed> {
    Arc::new(SlowFeed {
        delays: delays
            .iter()
            .map(|(k, ms)| (k.to_string(), Duration::from_millis(*ms)))
            .collect(),
    })
}

#[tokio::test(start_paused = true)]
async fn slow_stale_search_does_not_overwrite_newer_one() {
    let feed = feed(&[("tes", 300), ("tesla", 10)]);
    let mut view = ListingView::new(ViewKind::Search);
    let mut fetches = JoinSet::new();

    for keyword in ["tes", "tesla"] {
        let ticket = view.change_keyword(keyword).unwrap();
        let feed = Arc::clone(&feed);
        fetches.spawn(async move { ticket.execute(feed.as_ref()).await });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = fetches.join_next().await {
        let (ticket, result) = joined.unwrap();
        let keyword = ticket.query.keyword.clone();
        outcomes.push((keyword, view.complete(ticket, result)));
    }

    assert_eq!(
        outcomes,
        vec![
            ("tesla".to_string(), Completion::Applied),
            ("tes".to_string(), Completion::Discarded),
        ]
    );
    assert_eq!(view.store().items()[0].display_title(), "tesla p1");
}

#[tokio::test]
async fn load_more_fetches_next_page_for_current_query() {
    let feed = feed(&[]);
    let mut view = ListingView::new(ViewKind::Search);

    let ticket = view.change_keyword("Rust").unwrap();
    let (ticket, result) = ticket.execute(feed.as_ref()).await;
    assert_eq!(view.complete(ticket, result), Completion::Applied);

    let more = view.request_more().unwrap();
    assert_eq!(more.query.keyword, "rust");
    assert_eq!(more.query.page, 2);
    let (more, result) = more.execute(feed.as_ref()).await;
    assert_eq!(view.complete(more, result), Completion::Applied);

    let titles: Vec<&str> = view.store().items().iter().map(|a| a.display_title()).collect();
    assert_eq!(titles, vec!["rust p1", "rust p2"]);
}

#[tokio::test]
async fn feed_failure_surfaces_as_status() {
    let feed = feed(&[]);
    let mut view = ListingView::new(ViewKind::Search);

    let ticket = view.change_keyword("broken").unwrap();
    let (ticket, result) = ticket.execute(feed.as_ref()).await;
    assert_eq!(view.complete(ticket, result), Completion::Failed);
    match view.status() {
        nr_core::ViewStatus::Failed(message) => assert!(message.contains("too many requests")),
        other => panic!("unexpected status: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn debounced_typing_issues_a_single_search() {
    let feed = feed(&[]);
    let mut view = ListingView::new(ViewKind::Search);
    let (mut debouncer, mut keywords) = Debouncer::new(nr_core::DEFAULT_QUIET_PERIOD);

    for prefix in ["t", "te", "tes", "tesl", "tesla"] {
        debouncer.push(prefix.to_string());
        tokio::time::sleep(Duration::from_millis(120)).await;
    }

    let keyword = keywords.recv().await.unwrap();
    assert_eq!(keyword, "tesla");
    assert!(keywords.try_recv().is_err());

    let ticket = view.change_keyword(&keyword).unwrap();
    let (ticket, result) = ticket.execute(feed.as_ref()).await;
    view.complete(ticket, result);
    assert_eq!(view.store().items()[0].display_title(), "tesla p1");
}

#[tokio::test]
async fn headlines_view_uses_top_headlines_without_keyword() {
    let feed = feed(&[]);
    let mut view = ListingView::new(ViewKind::Headlines);

    let ticket = view.start().unwrap();
    let (ticket, result) = ticket.execute(feed.as_ref()).await;
    view.complete(ticket, result);
    assert_eq!(view.store().items()[0].display_title(), "headline p1");

    // Falls back to keyword search through the trait's default.
    let ticket = view.change_keyword("tesla").unwrap();
    let (ticket, result) = ticket.execute(feed.as_ref()).await;
    view.complete(ticket, result);
    assert_eq!(view.store().items()[0].display_title(), "tesla p1");
}

#[tokio::test]
async fn load_more_waits_for_pending_keyword_fetch() {
    let feed = feed(&[]);
    let mut view = ListingView::new(ViewKind::Headlines);
    let (ticket, result) = view.start().unwrap().execute(feed.as_ref()).await;
    view.complete(ticket, result);
    assert!(view.can_load_more());

    let search = view.change_keyword("rust").unwrap();
    assert!(!view.can_load_more());
    assert!(view.request_more().is_none());

    let (search, result) = search.execute(feed.as_ref()).await;
    assert_eq!(view.complete(search, result), Completion::Applied);
    assert_eq!(view.store().page(), 1);

    let more = view.request_more().unwrap();
    assert_eq!((more.query.keyword.as_str(), more.query.page), ("rust", 2));
    let (more, result) = more.execute(feed.as_ref()).await;
    assert_eq!(view.complete(more, result), Completion::Applied);

    let titles: Vec<_> = view.store().items().iter().map(|a| a.display_title()).collect();
    assert_eq!(titles, vec!["rust p1", "rust p2"]);
    assert_eq!(view.store().page(), 2);
}

#[tokio::test]
async fn failed_keyword_fetch_leaves_nothing_to_extend() {
    let feed = feed(&[]);
    let mut view = ListingView::new(ViewKind::Headlines);
    let (ticket, result) = view.start().unwrap().execute(feed.as_ref()).await;
    view.complete(ticket, result);

    let (search, result) = view.change_keyword("broken").unwrap().execute(feed.as_ref()).await;
    assert_eq!(view.complete(search, result), Completion::Failed);

    assert!(view.store().items().is_empty());
    assert!(view.request_more().is_none());
}
