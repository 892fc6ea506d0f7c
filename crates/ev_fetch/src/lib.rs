pub mod clean;
pub mod config;
pub mod digest;
pub mod manager;
pub mod reader;
pub mod search;
pub mod summarize;

pub use config::FetchConfig;
pub use digest::write_digest;
pub use manager::EvidenceFetcher;
pub use reader::{ContentReader, ReaderClient};
pub use search::{DuckDuckGoSearch, SearchProvider};

pub mod prelude {
    pub use super::{ContentReader, EvidenceFetcher, FetchConfig, SearchProvider};
    pub use ev_core::{Error, FetchRequest, FetchedArticle, Fetcher, Result};
}
