use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::types::{ModeChange, ModelChange, ModelReadiness, NewsItem, RefreshOutcome, SummaryMode};
use crate::Result;

/// The backend API surface the UI talks through.
///
/// `ht_api` implements this over HTTP; tests implement it in memory.
#[async_trait]
pub trait NewsBackend: Send + Sync {
    /// List the category keys the backend serves.
    async fn categories(&self) -> Result<Vec<String>>;

    /// Fetch news items, optionally scoped to a category key.
    async fn news(&self, category: Option<&str>, mode: SummaryMode) -> Result<Vec<NewsItem>>;

    /// Key → display name of the selectable summary models.
    async fn models(&self) -> Result<BTreeMap<String, String>>;

    /// Select the model that produces summaries and sentiment.
    async fn select_model(&self, key: &str) -> Result<ModelChange>;

    /// Query whether the backend is in simple or AI mode.
    async fn model_status(&self) -> Result<ModelReadiness>;

    /// Announce the summary mode to the backend.
    async fn select_summary_mode(&self, mode: SummaryMode) -> Result<ModeChange>;

    /// Ask the backend to re-pull a category from its sources.
    async fn refresh(&self, category: &str) -> Result<RefreshOutcome>;
}
