pub mod error;
pub mod logging;
pub mod models;
pub mod storage;
pub mod tags;
pub mod types;

pub use error::{Error, Result};
pub use logging::{init_logging, Logger};
pub use models::{Fetcher, GenerationRequest, InferenceModel, TagExtractor};
pub use storage::ArticleStorage;
pub use types::{Article, FetchRequest, FetchedArticle};

pub mod prelude {
    pub use super::{Article, ArticleStorage, Error, FetchRequest, FetchedArticle, Result};
    pub use super::{Fetcher, GenerationRequest, InferenceModel, TagExtractor};
}
