pub mod backend;
pub mod error;
pub mod types;

pub use backend::NewsBackend;
pub use error::Error;
pub use types::{
    ModeChange, ModelChange, ModelReadiness, ModelStatus, NewsItem, RefreshOutcome, Sentiment,
    SummaryMode, ALL_CATEGORIES,
};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::backend::NewsBackend;
    pub use crate::types::{ModelStatus, NewsItem, Sentiment, SummaryMode, ALL_CATEGORIES};
    pub use crate::{Error, Result};
}
