use std::collections::BTreeMap;

use ht_core::types::{ModelStatus, NewsItem, SummaryMode, ALL_CATEGORIES};

/// What the feed panel is showing. Replaced wholesale on every transition,
/// so cards can never coexist with the error panel and the loading
/// indicator never survives completion.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState {
    Loading,
    Loaded(Vec<NewsItem>),
    Empty,
    Failed(String),
}

impl FeedState {
    /// Classify a fetched list; an empty response is its own state.
    pub fn from_items(items: Vec<NewsItem>) -> Self {
        if items.is_empty() {
            FeedState::Empty
        } else {
            FeedState::Loaded(items)
        }
    }

    pub fn items(&self) -> &[NewsItem] {
        match self {
            FeedState::Loaded(items) => items,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FeedState::Loading)
    }
}

/// Model-selection popup.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPicker {
    keys: Vec<String>,
    cursor: usize,
}

impl ModelPicker {
    fn new(keys: Vec<String>, cursor: usize) -> Self {
        Self { keys, cursor }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&str> {
        self.keys.get(self.cursor).map(String::as_str)
    }

    fn next(&mut self) {
        if self.cursor + 1 < self.keys.len() {
            self.cursor += 1;
        }
    }

    fn prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }
}

/// All mutable UI state, owned by the event loop and updated only through
/// the transition methods below.
#[derive(Debug)]
pub struct UiState {
    active_category: String,
    summary_mode: SummaryMode,
    categories: Vec<String>,
    models: BTreeMap<String, String>,
    selected_model: Option<String>,
    model_status: ModelStatus,
    feed: FeedState,
    notice: Option<String>,
    cursor: usize,
    picker: Option<ModelPicker>,
    spinner_frame: usize,
    feed_seq: u64,
}

impl UiState {
    pub fn new(mode: SummaryMode) -> Self {
        Self {
            active_category: ALL_CATEGORIES.to_string(),
            summary_mode: mode,
            categories: Vec::new(),
            models: BTreeMap::new(),
            selected_model: None,
            model_status: ModelStatus::default(),
            feed: FeedState::Loading,
            notice: None,
            cursor: 0,
            picker: None,
            spinner_frame: 0,
            feed_seq: 0,
        }
    }

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    /// Category to request, `None` for the unscoped feed.
    pub fn category_filter(&self) -> Option<&str> {
        if self.active_category == ALL_CATEGORIES {
            None
        } else {
            Some(&self.active_category)
        }
    }

    pub fn summary_mode(&self) -> SummaryMode {
        self.summary_mode
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn models(&self) -> &BTreeMap<String, String> {
        &self.models
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    pub fn model_status(&self) -> ModelStatus {
        self.model_status
    }

    pub fn feed(&self) -> &FeedState {
        &self.feed
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn picker(&self) -> Option<&ModelPicker> {
        self.picker.as_ref()
    }

    pub fn spinner_frame(&self) -> usize {
        self.spinner_frame
    }

    pub fn selected_item(&self) -> Option<&NewsItem> {
        self.feed.items().get(self.cursor)
    }

    /// Tab position of the active category; 0 is the fixed "Tüm Haberler"
    /// entry. A single value, so at most one entry can ever be active.
    pub fn active_index(&self) -> usize {
        self.categories
            .iter()
            .position(|key| *key == self.active_category)
            .map(|pos| pos + 1)
            .unwrap_or(0)
    }

    pub fn tab_count(&self) -> usize {
        self.categories.len() + 1
    }

    pub fn set_categories(&mut self, keys: Vec<String>) {
        self.categories = keys;
    }

    pub fn select_category(&mut self, key: &str) {
        self.active_category = key.to_string();
        self.cursor = 0;
    }

    /// Step through the tab order (Tüm Haberler first), wrapping around.
    pub fn cycle_category(&mut self, step: isize) {
        let count = self.tab_count() as isize;
        let index = (self.active_index() as isize + step).rem_euclid(count) as usize;
        let key = if index == 0 {
            ALL_CATEGORIES.to_string()
        } else {
            self.categories[index - 1].clone()
        };
        self.select_category(&key);
    }

    /// Mark a new feed request in flight and return its sequence tag.
    pub fn begin_feed_load(&mut self) -> u64 {
        self.feed_seq += 1;
        self.feed = FeedState::Loading;
        self.cursor = 0;
        self.feed_seq
    }

    /// Apply a feed completion. Returns `false` (and changes nothing) when
    /// the tag is not the most recently issued one: latest request wins.
    pub fn finish_feed_load(
        &mut self,
        seq: u64,
        result: Result<Vec<NewsItem>, String>,
    ) -> bool {
        if seq != self.feed_seq {
            return false;
        }
        self.feed = match result {
            Ok(items) => FeedState::from_items(items),
            Err(message) => FeedState::Failed(message),
        };
        self.cursor = 0;
        true
    }

    pub fn set_models(&mut self, models: BTreeMap<String, String>) {
        self.models = models;
    }

    pub fn set_model_status(&mut self, status: ModelStatus) {
        self.model_status = status;
    }

    pub fn begin_model_change(&mut self) {
        self.model_status = ModelStatus::Loading;
    }

    pub fn model_changed(&mut self, key: &str, basit_mod: bool) {
        self.selected_model = Some(key.to_string());
        self.model_status = ModelStatus::from_basit_mod(basit_mod);
    }

    pub fn model_change_failed(&mut self, message: String) {
        self.model_status = ModelStatus::Failed;
        self.notice = Some(message);
    }

    pub fn apply_summary_mode(&mut self, mode: SummaryMode) {
        self.summary_mode = mode;
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    /// Open the model popup; `false` when the model list has not loaded.
    pub fn open_model_picker(&mut self) -> bool {
        if self.models.is_empty() {
            return false;
        }
        let keys: Vec<String> = self.models.keys().cloned().collect();
        let cursor = self
            .selected_model
            .as_ref()
            .and_then(|key| keys.iter().position(|k| k == key))
            .unwrap_or(0);
        self.picker = Some(ModelPicker::new(keys, cursor));
        true
    }

    pub fn close_model_picker(&mut self) {
        self.picker = None;
    }

    pub fn picker_next(&mut self) {
        if let Some(picker) = self.picker.as_mut() {
            picker.next();
        }
    }

    pub fn picker_prev(&mut self) {
        if let Some(picker) = self.picker.as_mut() {
            picker.prev();
        }
    }

    pub fn select_next_card(&mut self) {
        let len = self.feed.items().len();
        if len > 0 && self.cursor + 1 < len {
            self.cursor += 1;
        }
    }

    pub fn select_prev_card(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Advance the loading spinner; a no-op while nothing is in flight.
    pub fn tick(&mut self) {
        if self.feed.is_loading() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }
}
