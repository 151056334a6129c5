use std::str::FromStr;

use nr_core::SortMode;

pub const HELP: &str = "Commands: /<keyword> search (`/` alone clears), more, sort <mode>, open <n>, back, help, quit";

/// A user action typed at the browse prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Edit of the search box. Debounced before it reaches the view.
    Keyword(String),
    LoadMore,
    Sort(SortMode),
    /// Zero-based index into the current list.
    Open(usize),
    Back,
    Help,
    Quit,
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(keyword) = s.trim_start().strip_prefix('/') {
            return Ok(Intent::Keyword(keyword.to_string()));
        }

        let mut parts = s.split_whitespace();
        let command = parts.next().unwrap_or("").to_lowercase();
        let argument = parts.next();

        match (command.as_str(), argument) {
            ("more" | "m", None) => Ok(Intent::LoadMore),
            ("sort" | "s", Some(mode)) => mode.parse().map(Intent::Sort),
            ("sort" | "s", None) => Err("Usage: sort <publishedAt|popularity|relevance>".to_string()),
            ("open" | "o", Some(n)) => parse_position(n),
            ("open" | "o", None) => Err("Usage: open <n>".to_string()),
            ("back" | "b", None) => Ok(Intent::Back),
            ("help" | "h" | "?", None) => Ok(Intent::Help),
            ("quit" | "q" | "exit", None) => Ok(Intent::Quit),
            ("", None) => Err(HELP.to_string()),
            (n, None) if n.chars().all(|c| c.is_ascii_digit()) => parse_position(n),
            (other, _) => Err(format!("Unknown command: {}. {}", other, HELP)),
        }
    }
}

/// Positions are shown starting at 1.
fn parse_position(raw: &str) -> std::result::Result<Intent, String> {
    match raw.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(Intent::Open(n - 1)),
        _ => Err(format!("Invalid article number: {}", raw)),
    }
}
