use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel category key meaning "no category filter".
pub const ALL_CATEGORIES: &str = "tum";

/// A single news card as served by the backend.
///
/// Wire names are the backend's Turkish field names. Only `kategori`,
/// `baslik`, `ozet`, `kaynak` and `url` are guaranteed; everything else is
/// optional and absent fields decode as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(rename = "kategori")]
    pub category: String,
    #[serde(rename = "baslik")]
    pub title: String,
    #[serde(rename = "ozet")]
    pub summary: String,
    #[serde(rename = "kaynak")]
    pub source: String,
    pub url: String,
    #[serde(rename = "resim_url", default)]
    pub image_url: Option<String>,
    #[serde(rename = "duygu", default)]
    pub sentiment: Option<Sentiment>,
    #[serde(rename = "tarih", default, deserialize_with = "lenient_timestamp")]
    pub published_at: Option<NaiveDateTime>,
    #[serde(rename = "icerik", default)]
    pub content: Option<String>,
}

impl NewsItem {
    /// Image URL, with the backend's empty-string placeholder treated as absent.
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|u| !u.is_empty())
    }
}

/// Sentiment tag attached to a summary. Anything the backend sends outside
/// the two known polar tags folds to `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[serde(other)]
    Neutral,
}

/// How the backend should summarize: full summaries or the condensed form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    #[default]
    Normal,
    Kisa,
}

impl SummaryMode {
    /// Value used for the `ozet_modu` query parameter and the mode-change body.
    pub fn as_param(&self) -> &'static str {
        match self {
            SummaryMode::Normal => "normal",
            SummaryMode::Kisa => "kisa",
        }
    }

    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "normal" => Some(SummaryMode::Normal),
            "kisa" => Some(SummaryMode::Kisa),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SummaryMode::Normal => SummaryMode::Kisa,
            SummaryMode::Kisa => SummaryMode::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SummaryMode::Normal => "Normal",
            SummaryMode::Kisa => "Kısa",
        }
    }
}

/// State of the summary-model indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelStatus {
    /// Initial state, before `/api/model/durum` has answered.
    #[default]
    Loading,
    /// Backend is in simple (non-AI) summarization mode.
    Simple,
    /// Backend is running a full AI model.
    Ai,
    /// Status query or model change failed.
    Failed,
}

impl ModelStatus {
    pub fn from_basit_mod(basit_mod: bool) -> Self {
        if basit_mod {
            ModelStatus::Simple
        } else {
            ModelStatus::Ai
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModelStatus::Loading => "Model Yükleniyor...",
            ModelStatus::Simple => "Basit Mod",
            ModelStatus::Ai => "AI Modu",
            ModelStatus::Failed => "Model Hatası",
        }
    }
}

/// Response of `POST /api/model`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelChange {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub basit_mod: bool,
}

/// Response of `GET /api/model/durum`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelReadiness {
    pub basit_mod: bool,
}

/// Response of `POST /api/change_summary_mode`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModeChange {
    #[serde(default)]
    pub success: bool,
}

/// Response of `GET /api/yenile/{kategori}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshOutcome {
    #[serde(rename = "durum")]
    pub status: String,
    #[serde(rename = "mesaj")]
    pub message: String,
}

/// Timestamps arrive as ISO-8601 strings, with or without an offset;
/// anything unparseable decodes as `None` rather than failing the whole
/// feed.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}
