use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nr_core::{
    ArticleFeed, Completion, Debouncer, DisplaySurface, Error, FeedPage, ListingView, RequestTicket,
    ResultSet, Result, StoreChange, StoreObserver, ViewStatus,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::intent::{Intent, HELP};
use crate::terminal::TerminalSurface;

type FetchOutcome = (RequestTicket, Result<FeedPage>);

/// Set by the store whenever it changes; cleared by the render loop.
#[derive(Debug, Default)]
pub struct RedrawFlag(AtomicBool);

impl RedrawFlag {
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

impl StoreObserver for RedrawFlag {
    fn on_change(&self, change: StoreChange, state: &ResultSet) {
        debug!("Store changed: {:?} ({} items)", change, state.items.len());
        self.0.store(true, Ordering::SeqCst);
    }
}

fn spawn_fetch(fetches: &mut JoinSet<FetchOutcome>, feed: &Arc<dyn ArticleFeed>, ticket: RequestTicket) {
    let feed = Arc::clone(feed);
    debug!("Issuing {:?} #{} via {}", ticket.kind, ticket.seq, feed.name());
    fetches.spawn(async move { ticket.execute(feed.as_ref()).await });
}

/// Runs a fetch to completion, then keeps loading pages until `pages` are in.
pub async fn load_pages(
    feed: &dyn ArticleFeed,
    view: &mut ListingView,
    first: Option<RequestTicket>,
    pages: u32,
) -> Result<()> {
    let Some(ticket) = first else {
        return Ok(());
    };
    let (ticket, result) = ticket.execute(feed).await;
    view.complete(ticket, result);

    while view.store().page() < pages {
        let Some(ticket) = view.request_more() else {
            break;
        };
        let (ticket, result) = ticket.execute(feed).await;
        if view.complete(ticket, result) != Completion::Applied {
            break;
        }
    }

    match view.status() {
        ViewStatus::Failed(message) => Err(Error::External(anyhow::anyhow!(message.clone()))),
        _ => Ok(()),
    }
}

/// Interactive loop: reads intents from `input`, debounces keyword edits,
/// runs fetches in the background and re-renders after every change.
///
/// Returns when the user quits, or once input ends and nothing is pending.
pub async fn browse<R, W>(
    feed: Arc<dyn ArticleFeed>,
    mut view: ListingView,
    quiet_period: Duration,
    input: R,
    surface: &mut TerminalSurface<W>,
) -> Result<ListingView>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let redraw = Arc::new(RedrawFlag::default());
    let subscription = view.store_mut().subscribe(redraw.clone());
    let (mut debouncer, mut keywords) = Debouncer::<String>::new(quiet_period);
    let mut fetches: JoinSet<FetchOutcome> = JoinSet::new();
    let mut lines = input.lines();
    let mut input_done = false;

    info!("🗞️ Browsing with {} (quiet period {:?})", feed.name(), quiet_period);
    if let Some(ticket) = view.start() {
        spawn_fetch(&mut fetches, &feed, ticket);
    }
    surface.render(&view)?;

    loop {
        let status = view.status().clone();
        let screen = view.screen().clone();

        if input_done && fetches.is_empty() && !debouncer.is_pending() {
            match keywords.try_recv() {
                Ok(keyword) => {
                    if let Some(ticket) = view.change_keyword(&keyword) {
                        spawn_fetch(&mut fetches, &feed, ticket);
                    }
                }
                Err(_) => break,
            }
        } else {
            tokio::select! {
                line = lines.next_line(), if !input_done => {
                    match line? {
                        None => input_done = true,
                        Some(line) => match line.parse::<Intent>() {
                            Ok(Intent::Quit) => break,
                            Ok(Intent::Keyword(keyword)) => debouncer.push(keyword),
                            Ok(Intent::LoadMore) => {
                                if !view.can_load_more() {
                                    surface.notice("Nothing more to load")?;
                                } else if let Some(ticket) = view.request_more() {
                                    spawn_fetch(&mut fetches, &feed, ticket);
                                }
                            }
                            Ok(Intent::Sort(mode)) => {
                                if view.can_sort() {
                                    view.change_sort(mode);
                                } else {
                                    surface.notice("Sorting is available once a search has results")?;
                                }
                            }
                            Ok(Intent::Open(index)) => {
                                if view.open(index).is_none() {
                                    surface.notice(&format!("No article at {}", index + 1))?;
                                }
                            }
                            Ok(Intent::Back) => view.back(),
                            Ok(Intent::Help) => surface.notice(HELP)?,
                            Err(message) => surface.notice(&message)?,
                        },
                    }
                }
                Some(keyword) = keywords.recv() => {
                    if let Some(ticket) = view.change_keyword(&keyword) {
                        spawn_fetch(&mut fetches, &feed, ticket);
                    }
                }
                Some(joined) = fetches.join_next() => {
                    let (ticket, result) = joined.map_err(|e| Error::External(e.into()))?;
                    view.complete(ticket, result);
                }
                else => break,
            }
        }

        let changed = redraw.take() || *view.status() != status || *view.screen() != screen;
        if changed {
            surface.render(&view)?;
        }
    }

    debouncer.cancel();
    fetches.abort_all();
    view.store_mut().unsubscribe(subscription);
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nr_core::{Article, SortMode, ViewKind};
    use nr_feed::MemoryFeed;
    use tokio::io::{AsyncWriteExt, BufReader};

    fn feed() -> Arc<MemoryFeed> {
        Arc::new(
            MemoryFeed::new(vec![
                Article::titled("Tesla stock rises"),
                Article::titled("Apple news"),
                Article::titled("tesla factory opens"),
                Article::titled("Tesla recalls cars"),
            ])
            .with_page_size(2),
        )
    }

    async fn run(feed: Arc<MemoryFeed>, kind: ViewKind, script: &str) -> (ListingView, String) {
        let mut surface = TerminalSurface::new(Vec::new(), false);
        let view = browse(
            feed,
            ListingView::new(kind),
            Duration::from_millis(500),
            script.as_bytes(),
            &mut surface,
        )
        .await
        .unwrap();
        (view, String::from_utf8(surface.into_inner()).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_is_coalesced_into_one_fetch() {
        let feed = feed();
        let (view, output) = run(feed.clone(), ViewKind::Search, "/t\n/te\n/tesla\n").await;

        assert_eq!(feed.calls(), 1);
        assert_eq!(view.store().keyword(), "tesla");
        assert_eq!(view.store().items().len(), 2);
        assert_eq!(view.store().total_available(), 3);
        assert!(output.contains("Enter a keyword to search"));
        assert!(output.contains("[1] Tesla stock rises"));
        assert!(output.contains("Load more: type `more` (2 of 3)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_headlines_load_more_and_open() {
        let feed = feed();
        let (view, output) = run(feed.clone(), ViewKind::Headlines, "more\nopen 9\n").await;

        // `more` arrives before the first page, so there is nothing to load yet.
        assert!(output.contains("Nothing more to load"));
        assert!(output.contains("No article at 9"));
        assert_eq!(view.store().items().len(), 2);
        assert_eq!(feed.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_more_is_ignored_while_keyword_fetch_runs() {
        let feed = Arc::new(
            MemoryFeed::new(vec![
                Article::titled("Tesla stock rises"),
                Article::titled("Apple news"),
                Article::titled("tesla factory opens"),
                Article::titled("Tesla recalls cars"),
            ])
            .with_page_size(2)
            .with_delay(Duration::from_millis(100)),
        );
        let (reader, mut writer) = tokio::io::duplex(64);
        tokio::spawn(async move {
            // Headlines arrive at 100ms, the debounced search starts at 700ms
            // and answers at 800ms.
            tokio::time::sleep(Duration::from_millis(200)).await;
            writer.write_all(b"/tesla\n").await.unwrap();
            tokio::time::sleep(Duration::from_millis(550)).await;
            writer.write_all(b"more\nsort popularity\n").await.unwrap();
        });

        let mut surface = TerminalSurface::new(Vec::new(), false);
        let view = browse(
            feed.clone(),
            ListingView::new(ViewKind::Headlines),
            Duration::from_millis(500),
            BufReader::new(reader),
            &mut surface,
        )
        .await
        .unwrap();
        let output = String::from_utf8(surface.into_inner()).unwrap();

        assert_eq!(feed.calls(), 2);
        assert!(output.contains("Nothing more to load"));
        assert!(output.contains("Sorting is available once a search has results"));
        let titles: Vec<_> = view.store().items().iter().map(|a| a.display_title()).collect();
        assert_eq!(titles, vec!["Tesla stock rises", "tesla factory opens"]);
        assert_eq!(view.store().page(), 1);
        assert_eq!(view.store().sort_mode(), SortMode::PublishedAt);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_stops_immediately() {
        let feed = feed();
        let (view, _) = run(feed.clone(), ViewKind::Search, "quit\n/tesla\n").await;
        assert_eq!(view.store().keyword(), "");
        assert_eq!(feed.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sort_requires_results() {
        let (view, output) = run(feed(), ViewKind::Search, "sort popularity\n").await;
        assert!(output.contains("Sorting is available once a search has results"));
        assert_eq!(view.store().sort_mode(), SortMode::PublishedAt);
    }

    #[tokio::test]
    async fn test_load_pages_accumulates() {
        let feed = feed();
        let mut view = ListingView::new(ViewKind::Headlines);
        let first = view.start();
        load_pages(feed.as_ref(), &mut view, first, 5).await.unwrap();
        assert_eq!(view.store().items().len(), 4);
        assert_eq!(view.store().page(), 2);
        assert!(!view.can_load_more());
    }

    #[tokio::test]
    async fn test_load_pages_reports_failure() {
        let feed = MemoryFeed::new(vec![Article::titled("a")]).failing("offline");
        let mut view = ListingView::new(ViewKind::Headlines);
        let first = view.start();
        let err = load_pages(&feed, &mut view, first, 1).await.unwrap_err();
        assert!(err.to_string().contains("offline"));
    }
}
