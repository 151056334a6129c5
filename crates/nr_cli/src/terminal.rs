use std::io::{self, IsTerminal, Stdout, Write};

use crossterm::style::{style, Stylize};
use nr_core::{Article, DisplaySurface, ListingView, Result, Screen, SortMode, ViewKind, ViewStatus};

/// Line-oriented rendering of a [`ListingView`].
pub struct TerminalSurface<W: Write> {
    out: W,
    styled: bool,
}

impl TerminalSurface<Stdout> {
    pub fn stdout() -> Self {
        let styled = io::stdout().is_terminal();
        Self::new(io::stdout(), styled)
    }
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, styled: bool) -> Self {
        Self { out, styled }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn bold(&self, text: &str) -> String {
        if self.styled {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.styled {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }

    fn alert(&self, text: &str) -> String {
        if self.styled {
            style(text).red().to_string()
        } else {
            text.to_string()
        }
    }

    /// One-off message outside of a full render (bad command, etc.).
    pub fn notice(&mut self, message: &str) -> Result<()> {
        let line = self.dim(message);
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        Ok(())
    }

    fn render_list(&mut self, view: &ListingView) -> Result<()> {
        let store = view.store();
        let heading = match view.kind() {
            ViewKind::Headlines => "Top headlines",
            ViewKind::Search => "Search",
        };
        let heading = self.bold(heading);
        writeln!(self.out, "\n{}", heading)?;
        if !store.keyword().is_empty() {
            writeln!(self.out, "Keyword: {}  Sort: {}", store.keyword(), store.sort_mode().label())?;
        }

        match view.status() {
            ViewStatus::Loading => {
                writeln!(self.out, "Loading...")?;
                self.out.flush()?;
                return Ok(());
            }
            ViewStatus::Failed(message) => {
                let line = self.alert(&format!("An error has occurred: {}", message));
                writeln!(self.out, "{}", line)?;
            }
            ViewStatus::Idle | ViewStatus::Ready => {}
        }

        if store.items().is_empty() {
            writeln!(self.out, "{}", view.empty_message())?;
        }
        for (index, article) in store.items().iter().enumerate() {
            let title = self.bold(article.display_title());
            writeln!(self.out, "[{}] {}", index + 1, title)?;
            if let Some(description) = article.description.as_deref() {
                let description = self.dim(description);
                writeln!(self.out, "    {}", description)?;
            }
        }

        if view.can_load_more() {
            if store.is_loading_more() {
                writeln!(self.out, "Loading...")?;
            } else {
                writeln!(
                    self.out,
                    "Load more: type `more` ({} of {})",
                    store.items().len(),
                    store.total_available()
                )?;
            }
        }
        if view.can_sort() {
            let modes = SortMode::ALL.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(" | ");
            writeln!(self.out, "Sort with `sort <{}>`", modes)?;
        }
        writeln!(self.out, "Open an article with `open <n>`")?;
        self.out.flush()?;
        Ok(())
    }

    fn render_detail(&mut self, article: &Article) -> Result<()> {
        writeln!(self.out, "\n< Go back (`back`)")?;
        if let Some(image) = article.url_to_image.as_deref() {
            writeln!(self.out, "Image: {}", image)?;
        }
        writeln!(self.out, "Source: {}", article.display_source())?;
        let title = self.bold(article.display_title());
        writeln!(self.out, "\n{}", title)?;
        if let Some(description) = article.description.as_deref() {
            writeln!(self.out, "- {} -", description)?;
        }
        let byline = article.byline();
        if !byline.is_empty() {
            let byline = self.dim(&byline);
            writeln!(self.out, "{}", byline)?;
        }
        if let Some(content) = article.content.as_deref() {
            writeln!(self.out, "\n{}", content)?;
        }
        if let Some(url) = article.url.as_deref() {
            writeln!(self.out, "\nRead the full article: {}", url)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> DisplaySurface for TerminalSurface<W> {
    fn render(&mut self, view: &ListingView) -> Result<()> {
        match view.screen() {
            Screen::List => self.render_list(view),
            Screen::Detail(article) => self.render_detail(article),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nr_core::{Error, FeedPage};

    fn render(view: &ListingView) -> String {
        let mut surface = TerminalSurface::new(Vec::new(), false);
        surface.render(view).unwrap();
        String::from_utf8(surface.into_inner()).unwrap()
    }

    fn loaded(kind: ViewKind, keyword: Option<&str>, page: FeedPage) -> ListingView {
        let mut view = ListingView::new(kind);
        let ticket = match keyword {
            Some(keyword) => view.change_keyword(keyword),
            None => view.start(),
        }
        .unwrap();
        view.complete(ticket, Ok(page));
        view
    }

    #[test]
    fn test_renders_list_with_load_more() {
        let mut article = Article::titled("Tesla stock rises");
        article.description = Some("Shares climbed.".to_string());
        let view = loaded(ViewKind::Headlines, None, FeedPage::new(vec![article], 3));

        let output = render(&view);
        assert!(output.contains("Top headlines"));
        assert!(output.contains("[1] Tesla stock rises"));
        assert!(output.contains("    Shares climbed."));
        assert!(output.contains("Load more: type `more` (1 of 3)"));
        assert!(!output.contains("Sort with"));
    }

    #[test]
    fn test_renders_sort_hint_for_active_search() {
        let view = loaded(
            ViewKind::Search,
            Some("tesla"),
            FeedPage::new(vec![Article::titled("Tesla")], 1),
        );
        let output = render(&view);
        assert!(output.contains("Keyword: tesla  Sort: Published Date"));
        assert!(output.contains("Sort with `sort <publishedAt | popularity | relevance>`"));
        assert!(!output.contains("Load more"));
    }

    #[test]
    fn test_renders_empty_messages() {
        let view = ListingView::new(ViewKind::Search);
        assert!(render(&view).contains("Enter a keyword to search"));

        let view = loaded(ViewKind::Search, Some("nothing"), FeedPage::empty());
        assert!(render(&view).contains("No data found or API key has been exhausted."));
    }

    #[test]
    fn test_renders_inline_error() {
        let mut view = ListingView::new(ViewKind::Headlines);
        let ticket = view.start().unwrap();
        view.complete(
            ticket,
            Err(Error::Feed {
                code: "apiKeyInvalid".to_string(),
                message: "Your API key is invalid.".to_string(),
            }),
        );
        let output = render(&view);
        assert!(output.contains("An error has occurred: Feed error (apiKeyInvalid): Your API key is invalid."));
    }

    #[test]
    fn test_renders_loading() {
        let mut view = ListingView::new(ViewKind::Headlines);
        let _ticket = view.start();
        assert!(render(&view).contains("Loading..."));
    }

    #[test]
    fn test_renders_detail() {
        let article = Article {
            source_name: None,
            author: Some("Jane Doe".to_string()),
            title: Some("Tesla stock rises".to_string()),
            description: Some("Shares climbed.".to_string()),
            url: Some("https://example.com/tesla".to_string()),
            published_at: Some(Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap()),
            content: Some("Full text.".to_string()),
            ..Article::default()
        };
        let mut view = loaded(ViewKind::Headlines, None, FeedPage::new(vec![article], 1));
        view.open(0);

        let output = render(&view);
        assert!(output.contains("Source: N/A"));
        assert!(output.contains("- Shares climbed. -"));
        assert!(output.contains("Jane Doe | March 05 2024"));
        assert!(output.contains("Read the full article: https://example.com/tesla"));
        assert!(!output.contains("Image:"));
    }
}
