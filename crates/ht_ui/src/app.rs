use std::collections::BTreeMap;
use std::io::Stdout;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event as TermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{info, warn};

use ht_core::types::{
    ModeChange, ModelChange, ModelReadiness, ModelStatus, NewsItem, RefreshOutcome, SummaryMode,
};
use ht_core::{NewsBackend, Result};

use crate::render;
use crate::state::UiState;

const TICK_INTERVAL: Duration = Duration::from_millis(120);

/// Completion message from a spawned API call. Feed completions carry the
/// sequence tag they were issued with so stale ones can be discarded.
#[derive(Debug)]
pub enum ApiEvent {
    Categories(std::result::Result<Vec<String>, String>),
    Feed {
        seq: u64,
        result: std::result::Result<Vec<NewsItem>, String>,
    },
    Models(std::result::Result<BTreeMap<String, String>, String>),
    ModelChanged {
        key: String,
        result: std::result::Result<ModelChange, String>,
    },
    ModelStatus(std::result::Result<ModelReadiness, String>),
    ModeChanged {
        mode: SummaryMode,
        result: std::result::Result<ModeChange, String>,
    },
    Refreshed(std::result::Result<RefreshOutcome, String>),
}

/// The interactive terminal front end: one task per API call, one owner of
/// the UI state, everything multiplexed over a single channel.
pub struct App {
    backend: Arc<dyn NewsBackend>,
    state: UiState,
    tx: mpsc::UnboundedSender<ApiEvent>,
    rx: mpsc::UnboundedReceiver<ApiEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(backend: Arc<dyn NewsBackend>, mode: SummaryMode) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            state: UiState::new(mode),
            tx,
            rx,
            should_quit: false,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let result = self.event_loop(&mut terminal).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<()> {
        let mut term_events = EventStream::new();
        let mut tick = tokio::time::interval(TICK_INTERVAL);
        self.bootstrap();

        while !self.should_quit {
            terminal.draw(|frame| render::draw(frame, &self.state))?;

            tokio::select! {
                maybe_event = term_events.next() => match maybe_event {
                    Some(Ok(TermEvent::Key(key))) => self.handle_key(key),
                    Some(Ok(_)) => {} // resize is picked up by the next draw
                    Some(Err(err)) => warn!(error = %err, "terminal event stream failed"),
                    None => break,
                },
                Some(event) = self.rx.recv() => self.apply(event),
                _ = tick.tick() => self.state.tick(),
            }
        }
        Ok(())
    }

    /// Initial loads: categories, models, model status and the unscoped
    /// feed, all in flight at once.
    fn bootstrap(&mut self) {
        self.spawn_categories();
        self.spawn_models();
        self.spawn_model_status();
        self.spawn_feed_load();
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        if self.state.picker().is_some() {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => self.state.close_model_picker(),
                KeyCode::Down | KeyCode::Char('j') => self.state.picker_next(),
                KeyCode::Up | KeyCode::Char('k') => self.state.picker_prev(),
                KeyCode::Enter => {
                    if let Some(key) = self
                        .state
                        .picker()
                        .and_then(|picker| picker.current())
                        .map(str::to_owned)
                    {
                        self.state.close_model_picker();
                        self.spawn_model_change(key);
                    }
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                self.state.cycle_category(1);
                self.spawn_feed_load();
            }
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.state.cycle_category(-1);
                self.spawn_feed_load();
            }
            KeyCode::Down | KeyCode::Char('j') => self.state.select_next_card(),
            KeyCode::Up | KeyCode::Char('k') => self.state.select_prev_card(),
            KeyCode::Char('o') => {
                let target = self.state.summary_mode().toggled();
                self.spawn_mode_change(target);
            }
            KeyCode::Char('m') => {
                if !self.state.open_model_picker() {
                    self.state.set_notice("Model listesi henüz yüklenmedi");
                }
            }
            KeyCode::Char('r') => match self.state.category_filter() {
                Some(category) => self.spawn_refresh(category.to_owned()),
                None => self.spawn_feed_load(),
            },
            KeyCode::Enter => {
                if let Some(url) = self.state.selected_item().map(|item| item.url.clone()) {
                    if let Err(err) = open_in_browser(&url) {
                        warn!(error = %err, url = %url, "article could not be opened");
                        self.state.set_notice("Bağlantı açılamadı");
                    }
                }
            }
            _ => {}
        }
    }

    fn apply(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::Categories(Ok(keys)) => {
                info!(count = keys.len(), "categories loaded");
                self.state.set_categories(keys);
            }
            ApiEvent::Categories(Err(err)) => {
                warn!(error = %err, "category load failed");
                self.state.set_notice("Kategoriler yüklenemedi");
            }
            ApiEvent::Feed { seq, result } => {
                let result = result.inspect_err(|err| warn!(error = %err, "feed load failed"));
                if !self.state.finish_feed_load(seq, result) {
                    info!(seq, "stale feed response dropped");
                }
            }
            ApiEvent::Models(Ok(models)) => {
                info!(count = models.len(), "models loaded");
                self.state.set_models(models);
            }
            ApiEvent::Models(Err(err)) => {
                warn!(error = %err, "model list load failed");
                self.state.set_notice("Model listesi yüklenemedi");
            }
            ApiEvent::ModelChanged { key, result } => match result {
                Ok(change) if change.success => {
                    info!(model = %key, basit_mod = change.basit_mod, "model changed");
                    self.state.model_changed(&key, change.basit_mod);
                    self.spawn_feed_load();
                }
                Ok(_) => {
                    warn!(model = %key, "backend rejected model change");
                    self.state
                        .model_change_failed("Model değiştirilemedi".to_string());
                }
                Err(err) => {
                    warn!(model = %key, error = %err, "model change failed");
                    self.state
                        .model_change_failed("Model değiştirilemedi".to_string());
                }
            },
            ApiEvent::ModelStatus(Ok(readiness)) => {
                self.state
                    .set_model_status(ModelStatus::from_basit_mod(readiness.basit_mod));
            }
            ApiEvent::ModelStatus(Err(err)) => {
                warn!(error = %err, "model status query failed");
                self.state.set_model_status(ModelStatus::Failed);
            }
            ApiEvent::ModeChanged { mode, result } => match result {
                Ok(change) if change.success => {
                    info!(mode = mode.as_param(), "summary mode changed");
                    self.state.apply_summary_mode(mode);
                    self.spawn_feed_load();
                }
                Ok(_) | Err(_) => {
                    warn!(mode = mode.as_param(), "summary mode change failed");
                    self.state.set_notice("Özet modu değiştirilemedi");
                }
            },
            ApiEvent::Refreshed(Ok(outcome)) => {
                info!(status = %outcome.status, "category refreshed");
                self.state.set_notice(outcome.message);
                self.spawn_feed_load();
            }
            ApiEvent::Refreshed(Err(err)) => {
                warn!(error = %err, "category refresh failed");
                self.state.set_notice("Kategori yenilenemedi");
            }
        }
    }

    fn spawn_categories(&self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.categories().await.map_err(|e| e.to_string());
            let _ = tx.send(ApiEvent::Categories(result));
        });
    }

    fn spawn_feed_load(&mut self) {
        let seq = self.state.begin_feed_load();
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let category = self.state.category_filter().map(str::to_owned);
        let mode = self.state.summary_mode();
        tokio::spawn(async move {
            let result = backend
                .news(category.as_deref(), mode)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(ApiEvent::Feed { seq, result });
        });
    }

    fn spawn_models(&self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.models().await.map_err(|e| e.to_string());
            let _ = tx.send(ApiEvent::Models(result));
        });
    }

    fn spawn_model_status(&self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.model_status().await.map_err(|e| e.to_string());
            let _ = tx.send(ApiEvent::ModelStatus(result));
        });
    }

    fn spawn_model_change(&mut self, key: String) {
        self.state.begin_model_change();
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.select_model(&key).await.map_err(|e| e.to_string());
            let _ = tx.send(ApiEvent::ModelChanged { key, result });
        });
    }

    fn spawn_mode_change(&self, mode: SummaryMode) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend
                .select_summary_mode(mode)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(ApiEvent::ModeChanged { mode, result });
        });
    }

    fn spawn_refresh(&self, category: String) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend.refresh(&category).await.map_err(|e| e.to_string());
            let _ = tx.send(ApiEvent::Refreshed(result));
        });
    }
}

fn open_in_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(not(target_os = "macos"))]
    let opener = "xdg-open";

    Command::new(opener)
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FeedState;
    use async_trait::async_trait;
    use crossterm::event::KeyModifiers;
    use ht_core::types::ALL_CATEGORIES;
    use ht_core::Error;

    /// Canned backend, in the spirit of the in-memory storage used by the
    /// library tests: category-dependent feeds, switchable failure mode.
    struct FakeBackend {
        fail: bool,
    }

    impl FakeBackend {
        fn ok() -> Arc<Self> {
            Arc::new(Self { fail: false })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { fail: true })
        }

        fn item(category: &str, title: &str) -> NewsItem {
            NewsItem {
                category: category.to_string(),
                title: title.to_string(),
                summary: format!("{title} özeti"),
                source: "test".to_string(),
                url: format!("https://example.com/{category}"),
                image_url: None,
                sentiment: None,
                published_at: None,
                content: None,
            }
        }

        fn guard(&self) -> Result<()> {
            if self.fail {
                Err(Error::Backend("bağlantı reddedildi".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl NewsBackend for FakeBackend {
        async fn categories(&self) -> Result<Vec<String>> {
            self.guard()?;
            Ok(vec!["spor".to_string(), "ekonomi".to_string()])
        }

        async fn news(&self, category: Option<&str>, _mode: SummaryMode) -> Result<Vec<NewsItem>> {
            self.guard()?;
            Ok(match category {
                None => vec![
                    Self::item("spor", "Derbi"),
                    Self::item("ekonomi", "Faiz kararı"),
                ],
                Some("spor") => vec![Self::item("spor", "Derbi")],
                Some(_) => vec![],
            })
        }

        async fn models(&self) -> Result<BTreeMap<String, String>> {
            self.guard()?;
            Ok([
                ("basit".to_string(), "Basit özetleyici".to_string()),
                ("transformers".to_string(), "BART (yerel)".to_string()),
            ]
            .into())
        }

        async fn select_model(&self, _key: &str) -> Result<ModelChange> {
            self.guard()?;
            Ok(ModelChange {
                success: true,
                basit_mod: false,
            })
        }

        async fn model_status(&self) -> Result<ModelReadiness> {
            self.guard()?;
            Ok(ModelReadiness { basit_mod: true })
        }

        async fn select_summary_mode(&self, _mode: SummaryMode) -> Result<ModeChange> {
            self.guard()?;
            Ok(ModeChange { success: true })
        }

        async fn refresh(&self, category: &str) -> Result<RefreshOutcome> {
            self.guard()?;
            Ok(RefreshOutcome {
                status: "başarılı".to_string(),
                message: format!("{category} kategorisinde 3 haber güncellendi"),
            })
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn pump(app: &mut App, count: usize) {
        for _ in 0..count {
            let event = app.rx.recv().await.expect("event");
            app.apply(event);
        }
    }

    #[tokio::test]
    async fn bootstrap_fills_every_panel() {
        let mut app = App::new(FakeBackend::ok(), SummaryMode::Normal);
        app.bootstrap();
        pump(&mut app, 4).await;

        assert_eq!(app.state.categories(), ["spor", "ekonomi"]);
        assert_eq!(app.state.feed().items().len(), 2);
        assert_eq!(app.state.model_status(), ModelStatus::Simple);
        assert_eq!(app.state.models().len(), 2);
    }

    #[tokio::test]
    async fn bootstrap_against_dead_backend_degrades_visibly() {
        let mut app = App::new(FakeBackend::failing(), SummaryMode::Normal);
        app.bootstrap();
        pump(&mut app, 4).await;

        assert!(matches!(app.state.feed(), FeedState::Failed(_)));
        assert_eq!(app.state.model_status(), ModelStatus::Failed);
        assert!(app.state.notice().is_some());
        assert!(app.state.categories().is_empty());
    }

    #[tokio::test]
    async fn switching_category_reloads_scoped_feed() {
        let mut app = App::new(FakeBackend::ok(), SummaryMode::Normal);
        app.bootstrap();
        pump(&mut app, 4).await;

        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.state.active_category(), "spor");
        assert!(app.state.feed().is_loading());
        pump(&mut app, 1).await;

        assert_eq!(app.state.feed().items().len(), 1);
        assert_eq!(app.state.feed().items()[0].title, "Derbi");
    }

    #[tokio::test]
    async fn empty_category_shows_placeholder_state() {
        let mut app = App::new(FakeBackend::ok(), SummaryMode::Normal);
        app.bootstrap();
        pump(&mut app, 4).await;

        app.handle_key(press(KeyCode::Tab));
        app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.state.active_category(), "ekonomi");
        pump(&mut app, 2).await;

        assert_eq!(*app.state.feed(), FeedState::Empty);
    }

    #[tokio::test]
    async fn mode_toggle_posts_then_reloads() {
        let mut app = App::new(FakeBackend::ok(), SummaryMode::Normal);
        app.bootstrap();
        pump(&mut app, 4).await;

        app.handle_key(press(KeyCode::Char('o')));
        pump(&mut app, 1).await; // mode change ack
        assert_eq!(app.state.summary_mode(), SummaryMode::Kisa);
        assert!(app.state.feed().is_loading());
        pump(&mut app, 1).await; // reloaded feed
        assert_eq!(app.state.feed().items().len(), 2);
    }

    #[tokio::test]
    async fn model_selection_updates_status_and_reloads() {
        let mut app = App::new(FakeBackend::ok(), SummaryMode::Normal);
        app.bootstrap();
        pump(&mut app, 4).await;

        app.handle_key(press(KeyCode::Char('m')));
        assert!(app.state.picker().is_some());
        app.handle_key(press(KeyCode::Down));
        app.handle_key(press(KeyCode::Enter));
        assert!(app.state.picker().is_none());
        assert_eq!(app.state.model_status(), ModelStatus::Loading);

        pump(&mut app, 1).await; // model change ack
        assert_eq!(app.state.selected_model(), Some("transformers"));
        assert_eq!(app.state.model_status(), ModelStatus::Ai);
        pump(&mut app, 1).await; // reloaded feed
        assert_eq!(app.state.feed().items().len(), 2);
    }

    #[tokio::test]
    async fn refresh_reports_backend_message() {
        let mut app = App::new(FakeBackend::ok(), SummaryMode::Normal);
        app.bootstrap();
        pump(&mut app, 4).await;

        app.handle_key(press(KeyCode::Tab)); // spor
        pump(&mut app, 1).await;
        app.handle_key(press(KeyCode::Char('r')));
        pump(&mut app, 1).await; // refresh outcome

        assert_eq!(
            app.state.notice(),
            Some("spor kategorisinde 3 haber güncellendi")
        );
        pump(&mut app, 1).await; // reloaded feed
        assert_eq!(app.state.feed().items().len(), 1);
    }

    #[tokio::test]
    async fn refresh_on_all_categories_just_reloads() {
        let mut app = App::new(FakeBackend::ok(), SummaryMode::Normal);
        app.bootstrap();
        pump(&mut app, 4).await;

        assert_eq!(app.state.active_category(), ALL_CATEGORIES);
        app.handle_key(press(KeyCode::Char('r')));
        assert!(app.state.feed().is_loading());
        pump(&mut app, 1).await;
        assert_eq!(app.state.feed().items().len(), 2);
    }

    #[tokio::test]
    async fn quit_keys_stop_the_loop() {
        let mut app = App::new(FakeBackend::ok(), SummaryMode::Normal);
        app.handle_key(press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
