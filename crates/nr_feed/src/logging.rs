use std::collections::VecDeque;
use std::sync::Once;

use tracing::Level;

static INIT: Once = Once::new();

/// Prefixes every message with the tags it was built with, e.g. `📡 newsapi`.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            prefixes: VecDeque::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push_back(prefix.into());
        self
    }

    fn prefixed(&self, message: &str) -> String {
        let prefix = self.prefixes.iter().map(|p| format!("{} ", p)).collect::<String>();
        format!("{}{}", prefix, message)
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}", self.prefixed(message));
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}", self.prefixed(message));
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", self.prefixed(message));
    }
}

/// Installs the global subscriber once. Logs go to stderr so stdout stays
/// usable for `--json` output.
pub fn init_logging(level: Level) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        });
    }
    Logger::new()
}
