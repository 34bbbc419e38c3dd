use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use ht_core::types::{ModelStatus, NewsItem, Sentiment};

use crate::state::{FeedState, ModelPicker, UiState};

pub const NO_NEWS_TEXT: &str = "Bu kategoride haber bulunamadı.";
pub const FEED_ERROR_TEXT: &str =
    "Haberler yüklenirken bir hata oluştu. Lütfen daha sonra tekrar deneyin.";

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Strip everything that could reprogram the terminal. Backend text is
/// untrusted; an escape sequence in a title must never reach the screen.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect()
}

/// Display form of a category key: first character upper-cased, remainder
/// lower-cased.
pub fn category_label(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.as_str().to_lowercase().chars())
            .collect(),
        None => String::new(),
    }
}

/// Icon for a sentiment tag; anything unknown or absent is neutral.
pub fn sentiment_icon(sentiment: Option<Sentiment>) -> &'static str {
    match sentiment.unwrap_or(Sentiment::Neutral) {
        Sentiment::Positive => "🙂",
        Sentiment::Negative => "🙁",
        Sentiment::Neutral => "😐",
    }
}

fn sentiment_style(sentiment: Option<Sentiment>) -> Style {
    match sentiment.unwrap_or(Sentiment::Neutral) {
        Sentiment::Positive => Style::default().fg(Color::Green),
        Sentiment::Negative => Style::default().fg(Color::Red),
        Sentiment::Neutral => Style::default().fg(Color::DarkGray),
    }
}

fn category_color(key: &str) -> Color {
    match key {
        "spor" => Color::Green,
        "ekonomi" => Color::Yellow,
        "teknoloji" => Color::Blue,
        "gundem" => Color::Red,
        _ => Color::Cyan,
    }
}

fn status_color(status: ModelStatus) -> Color {
    match status {
        ModelStatus::Loading => Color::Yellow,
        ModelStatus::Simple => Color::Cyan,
        ModelStatus::Ai => Color::Green,
        ModelStatus::Failed => Color::Red,
    }
}

/// One news card as styled lines, in card order: image marker, category
/// label, title, sentiment with summary, source, link.
pub fn card_lines(item: &NewsItem) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(image) = item.image() {
        lines.push(Line::from(Span::styled(
            format!("🖼 {}", sanitize(image)),
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines.push(Line::from(Span::styled(
        format!("[{}]", category_label(&sanitize(&item.category))),
        Style::default()
            .fg(category_color(&item.category))
            .add_modifier(Modifier::BOLD),
    )));

    lines.push(Line::from(Span::styled(
        sanitize(&item.title),
        Style::default().add_modifier(Modifier::BOLD),
    )));

    lines.push(Line::from(vec![
        Span::styled(
            sentiment_icon(item.sentiment),
            sentiment_style(item.sentiment),
        ),
        Span::raw(" "),
        Span::raw(sanitize(&item.summary)),
    ]));

    let mut source = format!("Kaynak: {}", sanitize(&item.source));
    if let Some(published_at) = item.published_at {
        source.push_str(&format!(" · {}", published_at.format("%d.%m.%Y %H:%M")));
    }
    lines.push(Line::from(Span::styled(
        source,
        Style::default().fg(Color::DarkGray),
    )));

    lines.push(Line::from(Span::styled(
        sanitize(&item.url),
        Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
    )));

    lines.push(Line::default());
    lines
}

/// Plain-text card for the one-shot CLI commands; same content and order as
/// the styled card.
pub fn card_plain(item: &NewsItem) -> String {
    let mut out = String::new();
    if let Some(image) = item.image() {
        out.push_str(&format!("🖼 {}\n", sanitize(image)));
    }
    out.push_str(&format!(
        "[{}] {}\n",
        category_label(&sanitize(&item.category)),
        sanitize(&item.title)
    ));
    out.push_str(&format!(
        "{} {}\n",
        sentiment_icon(item.sentiment),
        sanitize(&item.summary)
    ));
    out.push_str(&format!("Kaynak: {}", sanitize(&item.source)));
    if let Some(published_at) = item.published_at {
        out.push_str(&format!(" · {}", published_at.format("%d.%m.%Y %H:%M")));
    }
    out.push('\n');
    out.push_str(&sanitize(&item.url));
    out.push('\n');
    out
}

pub fn loading_line(frame: usize) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            SPINNER[frame % SPINNER.len()],
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" Haberler yükleniyor..."),
    ])
}

fn status_line(state: &UiState) -> Line<'static> {
    let status = state.model_status();
    let mut spans = vec![Span::styled(
        status.label(),
        Style::default()
            .fg(status_color(status))
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(key) = state.selected_model() {
        let name = state
            .models()
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string());
        spans.push(Span::raw(format!(" · {}", sanitize(&name))));
    }
    spans.push(Span::raw(format!(
        " · Özet: {}",
        state.summary_mode().label()
    )));
    if let Some(notice) = state.notice() {
        spans.push(Span::styled(
            format!(" — {}", sanitize(notice)),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

pub fn draw(frame: &mut Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_tabs(frame, state, chunks[0]);
    draw_feed(frame, state, chunks[1]);
    frame.render_widget(Paragraph::new(status_line(state)), chunks[2]);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Tab/←→ kategori · ↑↓ kart · Enter aç · o özet modu · m model · r yenile · q çıkış",
            Style::default().fg(Color::DarkGray),
        ))),
        chunks[3],
    );

    if let Some(picker) = state.picker() {
        draw_picker(frame, state, picker);
    }
}

fn draw_tabs(frame: &mut Frame, state: &UiState, area: Rect) {
    let mut titles = vec![Line::from("Tüm Haberler")];
    titles.extend(
        state
            .categories()
            .iter()
            .map(|key| Line::from(category_label(&sanitize(key)))),
    );

    let tabs = ratatui::widgets::Tabs::new(titles)
        .select(state.active_index())
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .block(Block::default().borders(Borders::ALL).title("Kategoriler"));
    frame.render_widget(tabs, area);
}

fn draw_feed(frame: &mut Frame, state: &UiState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Haberler");

    match state.feed() {
        FeedState::Loading => {
            let paragraph = Paragraph::new(loading_line(state.spinner_frame()))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(paragraph, area);
        }
        FeedState::Empty => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                NO_NEWS_TEXT,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )))
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(paragraph, area);
        }
        FeedState::Failed(detail) => {
            let lines = vec![
                Line::from(Span::styled(
                    FEED_ERROR_TEXT,
                    Style::default().fg(Color::Red),
                )),
                Line::from(Span::styled(
                    sanitize(detail),
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            let paragraph = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: false })
                .block(block);
            frame.render_widget(paragraph, area);
        }
        FeedState::Loaded(items) => {
            let cards: Vec<ListItem> = items
                .iter()
                .map(|item| ListItem::new(card_lines(item)))
                .collect();
            let count = cards.len();
            let list = List::new(cards)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!("Haberler ({count})")),
                )
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            let mut list_state = ListState::default().with_selected(Some(state.cursor()));
            frame.render_stateful_widget(list, area, &mut list_state);
        }
    }
}

fn draw_picker(frame: &mut Frame, state: &UiState, picker: &ModelPicker) {
    let area = centered_rect(50, 40, frame.size());
    frame.render_widget(Clear, area);

    let rows: Vec<ListItem> = picker
        .keys()
        .iter()
        .map(|key| {
            let name = state
                .models()
                .get(key)
                .cloned()
                .unwrap_or_else(|| key.clone());
            ListItem::new(Line::from(format!("{key} — {}", sanitize(&name))))
        })
        .collect();

    let list = List::new(rows)
        .block(Block::default().borders(Borders::ALL).title("Model Seç"))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        );
    let mut list_state = ListState::default().with_selected(Some(picker.cursor()));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
