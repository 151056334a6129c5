pub mod debounce;
pub mod error;
pub mod feed;
pub mod request;
pub mod scoring;
pub mod store;
pub mod surface;
pub mod types;
pub mod view;

pub use debounce::{Debouncer, PendingCall, DEFAULT_QUIET_PERIOD};
pub use error::Error;
pub use feed::ArticleFeed;
pub use request::{Query, RequestKind, RequestTicket, RequestTracker, ViewKind};
pub use store::{ResultSet, ResultSetStore, StoreChange, StoreObserver, SubscriptionId};
pub use surface::DisplaySurface;
pub use types::{Article, FeedPage, SortMode};
pub use view::{Completion, ListingView, Screen, ViewStatus};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::{Article, ArticleFeed, FeedPage, ListingView, Result, Error, SortMode, ViewKind};
}
