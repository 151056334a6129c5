use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use nr_core::{ArticleFeed, DisplaySurface, Error, ListingView, Result, SortMode, ViewKind};
use nr_feed::config::{API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_COUNTRY};
use nr_feed::FeedConfig;
use tracing::info;

mod app;
mod intent;
mod terminal;

use terminal::TerminalSurface;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse and search news headlines from the terminal", long_about = None)]
pub struct Cli {
    /// NewsAPI key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,
    /// Country for top headlines
    #[arg(long, default_value = DEFAULT_COUNTRY)]
    country: String,
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,
    /// Articles per page, left to the API when unset
    #[arg(long)]
    page_size: Option<u32>,
    /// Serve articles from a saved NewsAPI response instead of the network
    #[arg(long)]
    fixture: Option<PathBuf>,
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print top headlines
    Headlines {
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
        #[arg(long)]
        json: bool,
    },
    /// Search all articles for a keyword
    Search {
        keyword: String,
        /// publishedAt, popularity or relevance
        #[arg(long, default_value = "publishedAt")]
        sort: SortMode,
        #[arg(long, default_value_t = 1)]
        pages: u32,
        #[arg(long)]
        json: bool,
    },
    /// Interactive browser
    Browse {
        /// Start in the search view instead of top headlines
        #[arg(long)]
        search: bool,
        /// Quiet period before a typed keyword is searched
        #[arg(long, default_value_t = 500)]
        debounce_ms: u64,
    },
}

fn feed_config(cli: &Cli) -> Result<Option<FeedConfig>> {
    if cli.fixture.is_some() {
        return Ok(None);
    }
    let api_key = cli.api_key.clone().ok_or_else(|| {
        Error::Config(format!("{} is not set; pass --api-key or --fixture", API_KEY_ENV))
    })?;
    let mut config = FeedConfig::new(api_key)?
        .with_base_url(&cli.base_url)?
        .with_country(cli.country.clone());
    if let Some(page_size) = cli.page_size {
        config = config.with_page_size(page_size);
    }
    Ok(Some(config))
}

fn print(view: &ListingView, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view.store().state())?);
        Ok(())
    } else {
        TerminalSurface::stdout().render(view)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    nr_feed::init_logging(cli.log_level);

    let feed: Arc<dyn ArticleFeed> =
        nr_feed::create_feed(feed_config(&cli)?, cli.fixture.as_deref()).await?;
    info!("📡 Using {} feed", feed.name());

    match cli.command {
        Commands::Headlines { pages, json } => {
            let mut view = ListingView::new(ViewKind::Headlines);
            let first = view.start();
            app::load_pages(feed.as_ref(), &mut view, first, pages).await?;
            print(&view, json)?;
        }
        Commands::Search { keyword, sort, pages, json } => {
            let mut view = ListingView::new(ViewKind::Search);
            view.change_sort(sort);
            let first = view.change_keyword(&keyword);
            app::load_pages(feed.as_ref(), &mut view, first, pages).await?;
            print(&view, json)?;
        }
        Commands::Browse { search, debounce_ms } => {
            let kind = if search { ViewKind::Search } else { ViewKind::Headlines };
            let mut surface = TerminalSurface::stdout();
            surface.notice(intent::HELP)?;
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            app::browse(
                feed,
                ListingView::new(kind),
                Duration::from_millis(debounce_ms),
                input,
                &mut surface,
            )
            .await?;
        }
    }

    Ok(())
}
